use std::io::Write;

use csv::WriterBuilder;

use super::ResultsMatrix;
use crate::error::Result;

/// Downstream consumer of a study's results matrix.
///
/// Renderers such as a labeled heatmap live outside this crate and plug in
/// here; the crate ships plain-text, CSV and JSON reporters.
pub trait ResultsReporter {
    fn report(&mut self, matrix: &ResultsMatrix) -> Result<()>;
}

/// Aligned text grid, one line per mechanism.
pub struct TextReporter<W: Write> {
    out: W,
    precision: usize,
}

impl<W: Write> TextReporter<W> {
    #[must_use]
    pub const fn new(out: W) -> Self {
        Self { out, precision: 3 }
    }

    #[must_use]
    pub const fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultsReporter for TextReporter<W> {
    fn report(&mut self, matrix: &ResultsMatrix) -> Result<()> {
        let precision = self.precision;
        let cells: Vec<Vec<String>> = matrix
            .values
            .iter()
            .map(|row| row.iter().map(|v| format!("{v:.precision$}")).collect())
            .collect();

        let label_width = matrix
            .row_labels
            .iter()
            .map(String::len)
            .max()
            .unwrap_or(0);
        let widths: Vec<usize> = matrix
            .column_labels
            .iter()
            .enumerate()
            .map(|(column, label)| {
                cells
                    .iter()
                    .filter_map(|row| row.get(column))
                    .map(String::len)
                    .chain(std::iter::once(label.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(self.out, "{:label_width$}", "")?;
        for (label, width) in matrix.column_labels.iter().zip(&widths) {
            write!(self.out, "  {label:>width$}")?;
        }
        writeln!(self.out)?;

        for (label, row) in matrix.row_labels.iter().zip(&cells) {
            write!(self.out, "{label:<label_width$}")?;
            for (cell, width) in row.iter().zip(&widths) {
                write!(self.out, "  {cell:>width$}")?;
            }
            writeln!(self.out)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Matrix as CSV: a `mechanism` column followed by one column per metric.
pub struct CsvReporter<W: Write> {
    out: W,
}

impl<W: Write> CsvReporter<W> {
    #[must_use]
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultsReporter for CsvReporter<W> {
    fn report(&mut self, matrix: &ResultsMatrix) -> Result<()> {
        let mut writer = WriterBuilder::new().from_writer(&mut self.out);
        let mut header = vec!["mechanism"];
        header.extend(matrix.column_labels.iter().map(String::as_str));
        writer.write_record(&header)?;

        let mut buffer = ryu::Buffer::new();
        for (label, row) in matrix.row_labels.iter().zip(&matrix.values) {
            let mut record = vec![label.clone()];
            record.extend(row.iter().map(|&v| {
                if v.is_finite() {
                    buffer.format(v).to_owned()
                } else {
                    String::new()
                }
            }));
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Matrix serialised with serde; non-finite cells become `null`.
pub struct JsonReporter<W: Write> {
    out: W,
    pretty: bool,
}

impl<W: Write> JsonReporter<W> {
    #[must_use]
    pub const fn new(out: W) -> Self {
        Self { out, pretty: true }
    }

    #[must_use]
    pub const fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultsReporter for JsonReporter<W> {
    fn report(&mut self, matrix: &ResultsMatrix) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.out, matrix)?;
        } else {
            serde_json::to_writer(&mut self.out, matrix)?;
        }
        writeln!(self.out)?;
        Ok(())
    }
}
