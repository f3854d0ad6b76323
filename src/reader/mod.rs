//! Loads delimited text into a [`Dataset`].

mod infer;
mod missing;

use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

pub use missing::MissingTokens;

use crate::dataset::Dataset;
use crate::error::{Error, Result};

/// Configures how delimited text is parsed.
#[derive(Debug, Clone)]
pub struct CsvReadOptions {
    delimiter: u8,
    missing: MissingTokens,
    max_rows: Option<usize>,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvReadOptions {
    #[must_use]
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            missing: MissingTokens::default(),
            max_rows: None,
        }
    }

    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_missing_tokens(mut self, missing: MissingTokens) -> Self {
        self.missing = missing;
        self
    }

    #[must_use]
    pub const fn with_max_rows(mut self, count: usize) -> Self {
        self.max_rows = Some(count);
        self
    }
}

/// Reads a headed CSV stream into a dataset, inferring each column's kind.
///
/// # Errors
///
/// Returns an error if the stream cannot be parsed, a row has a different
/// field count than the header, or the header repeats a column name.
pub fn read_csv<R: Read>(reader: R, options: &CsvReadOptions) -> Result<Dataset> {
    let mut csv = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let names: Vec<String> = csv
        .headers()?
        .iter()
        .map(|name| name.trim().to_owned())
        .collect();
    if names.is_empty() {
        return Err(Error::InvalidData {
            details: Cow::from("CSV input has no header row"),
        });
    }

    let mut fields: Vec<Vec<String>> = vec![Vec::new(); names.len()];
    for (row, record) in csv.records().enumerate() {
        if options.max_rows.is_some_and(|max| row >= max) {
            break;
        }
        let record = record?;
        for (column, field) in fields.iter_mut().zip(record.iter()) {
            column.push(field.to_owned());
        }
    }

    let columns = names
        .into_iter()
        .zip(fields)
        .map(|(name, raw)| infer::build_column(name, raw, &options.missing))
        .collect::<Result<Vec<_>>>()?;
    Dataset::new(columns)
}

/// Opens `path` and reads it with [`read_csv`].
///
/// # Errors
///
/// Returns an error if the file cannot be opened or parsed.
pub fn read_csv_path(path: &Path, options: &CsvReadOptions) -> Result<Dataset> {
    let file = File::open(path)?;
    read_csv(file, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ColumnKind;

    const STORES: &str = "\
region,sales,units,promo
A,10.5,3,true
A,,4,false
B,30,NA,true
";

    #[test]
    fn reads_and_types_columns() {
        let dataset = read_csv(STORES.as_bytes(), &CsvReadOptions::new()).unwrap();
        assert_eq!(dataset.row_count(), 3);
        let kinds: Vec<_> = dataset.columns().iter().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ColumnKind::Text,
                ColumnKind::Float,
                ColumnKind::Integer,
                ColumnKind::Boolean,
            ]
        );
        assert_eq!(dataset.missing_count("sales").unwrap(), 1);
        assert_eq!(dataset.missing_count("units").unwrap(), 1);
    }

    #[test]
    fn max_rows_truncates() {
        let options = CsvReadOptions::new().with_max_rows(2);
        let dataset = read_csv(STORES.as_bytes(), &options).unwrap();
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(
            dataset.column("units").unwrap().kind(),
            ColumnKind::Integer
        );
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let input = "a,b\n1,2\n3\n";
        let err = read_csv(input.as_bytes(), &CsvReadOptions::new()).unwrap_err();
        assert!(matches!(err, Error::Csv { .. }));
    }

    #[test]
    fn duplicate_headers_are_rejected() {
        let input = "a,a\n1,2\n";
        let err = read_csv(input.as_bytes(), &CsvReadOptions::new()).unwrap_err();
        assert!(matches!(err, Error::DuplicateColumn { .. }));
    }

    #[test]
    fn tab_delimited_input() {
        let input = "x\ty\n1\tfoo\n2\tbar\n";
        let options = CsvReadOptions::new().with_delimiter(b'\t');
        let dataset = read_csv(input.as_bytes(), &options).unwrap();
        assert_eq!(dataset.column("y").unwrap().kind(), ColumnKind::Text);
    }
}
