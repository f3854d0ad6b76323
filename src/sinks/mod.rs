mod csv;

use crate::dataset::{Column, Dataset};
use crate::error::Result;
use crate::value::Value;

pub use self::csv::CsvSink;

/// Provides the dataset layout to sinks during initialisation.
pub struct SinkContext<'a> {
    pub columns: &'a [Column],
    pub row_count: usize,
}

impl<'a> SinkContext<'a> {
    #[must_use]
    pub fn new(dataset: &'a Dataset) -> Self {
        Self {
            columns: dataset.columns(),
            row_count: dataset.row_count(),
        }
    }
}

/// Trait implemented by sinks that consume dataset rows.
pub trait RowSink {
    /// Called before any rows are written to allow the sink to initialise internal state.
    fn begin(&mut self, context: SinkContext<'_>) -> Result<()>;

    /// Invoked for every row, cells in column order.
    fn write_row(&mut self, row: &[&Value]) -> Result<()>;

    /// Called once all rows have been forwarded to the sink.
    fn finish(&mut self) -> Result<()>;
}
