mod column;
mod mask;

use std::borrow::Cow;
use std::collections::HashSet;

pub use column::{Column, ColumnKind};
pub use mask::MissingMask;

use crate::error::{Error, Result};
use crate::sinks::{RowSink, SinkContext};
use crate::value::{MissingValue, Value};

/// Ordered collection of equally long, uniquely named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Assembles a dataset from columns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateColumn`] if two columns share a name and
    /// [`Error::LengthMismatch`] if the columns differ in length.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map_or(0, Column::len);
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(Error::DuplicateColumn {
                    name: Cow::Owned(column.name().to_owned()),
                });
            }
            if column.len() != row_count {
                return Err(Error::LengthMismatch {
                    column: Cow::Owned(column.name().to_owned()),
                    expected: row_count,
                    found: column.len(),
                });
            }
        }
        Ok(Self { columns, row_count })
    }

    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.row_count
    }

    #[must_use]
    pub const fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name() == name)
    }

    /// Looks up a column by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnNotFound`] if no column has that name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|column| column.name() == name)
            .ok_or_else(|| Error::column_not_found(name))
    }

    fn column_mut(&mut self, name: &str) -> Result<&mut Column> {
        self.columns
            .iter_mut()
            .find(|column| column.name() == name)
            .ok_or_else(|| Error::column_not_found(name))
    }

    /// Number of missing cells in a column, whatever their provenance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnNotFound`] if no column has that name.
    pub fn missing_count(&self, name: &str) -> Result<usize> {
        self.column(name).map(Column::missing_count)
    }

    /// Writes `marker` into every selected row of `column` in a single pass.
    /// Returns the number of cells that were not missing before.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnNotFound`] if the column is absent and
    /// [`Error::LengthMismatch`] if the mask does not cover every row. Both are
    /// checked before any cell is touched.
    pub fn apply_mask(
        &mut self,
        column: &str,
        mask: &MissingMask,
        marker: MissingValue,
    ) -> Result<usize> {
        let row_count = self.row_count;
        let target = self.column_mut(column)?;
        if mask.len() != row_count {
            return Err(Error::LengthMismatch {
                column: Cow::Owned(format!("{column} (mask)")),
                expected: row_count,
                found: mask.len(),
            });
        }
        Ok(mask
            .selected()
            .filter(|&row| target.mark_missing(row, marker))
            .count())
    }

    /// Streams the dataset row by row into `sink`.
    ///
    /// # Errors
    ///
    /// Propagates any error reported by the sink.
    pub fn write_to<S: RowSink>(&self, sink: &mut S) -> Result<()> {
        sink.begin(SinkContext::new(self))?;
        let mut row: Vec<&Value> = Vec::with_capacity(self.columns.len());
        for index in 0..self.row_count {
            row.clear();
            row.extend(self.columns.iter().map(|column| &column.values()[index]));
            sink.write_row(&row)?;
        }
        sink.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mechanism::MechanismKind;

    fn sample() -> Dataset {
        Dataset::new(vec![
            Column::text("region", ["A", "A", "B", "B"]),
            Column::float("sales", [1.0, 2.0, 3.0, 4.0]),
        ])
        .unwrap()
    }

    #[test]
    fn new_rejects_ragged_columns() {
        let err = Dataset::new(vec![
            Column::float("a", [1.0, 2.0]),
            Column::float("b", [1.0]),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            Error::LengthMismatch {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn new_rejects_duplicate_names() {
        let err = Dataset::new(vec![
            Column::float("a", [1.0]),
            Column::integer("a", [1]),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateColumn { .. }));
    }

    #[test]
    fn column_lookup_reports_missing_name() {
        let dataset = sample();
        assert_eq!(dataset.column_index("sales"), Some(1));
        let err = dataset.column("profit").unwrap_err();
        assert_eq!(err.to_string(), "column 'profit' not found");
    }

    #[test]
    fn apply_mask_marks_selected_rows_only() {
        let mut dataset = sample();
        let mask = MissingMask::new(vec![true, false, false, true]);
        let marker = MissingValue::Injected(MechanismKind::Mcar);
        let written = dataset.apply_mask("sales", &mask, marker).unwrap();
        assert_eq!(written, 2);

        let sales = dataset.column("sales").unwrap();
        assert_eq!(sales.values()[0], Value::Missing(marker));
        assert_eq!(sales.values()[1], Value::Float(2.0));
        assert_eq!(sales.kind(), ColumnKind::Float);
        assert_eq!(dataset.missing_count("region").unwrap(), 0);
    }

    #[test]
    fn apply_mask_validates_length_before_writing() {
        let mut dataset = sample();
        let mask = MissingMask::new(vec![true, true]);
        let marker = MissingValue::Injected(MechanismKind::Mcar);
        assert!(dataset.apply_mask("sales", &mask, marker).is_err());
        assert_eq!(dataset.missing_count("sales").unwrap(), 0);
    }
}
