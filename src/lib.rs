pub mod dataset;
pub mod error;
pub mod logger;
pub mod mechanism;
pub mod probability;
pub mod reader;
pub mod sampler;
pub mod sinks;
pub mod study;
pub mod value;
pub use crate::error::{Error, Result};
pub use dataset::{Column, ColumnKind, Dataset, MissingMask};
pub use mechanism::{Injected, Mechanism, MechanismKind, mar, mcar, nmar};
pub use reader::{CsvReadOptions, read_csv, read_csv_path};
pub use sampler::{MissRng, create_rng};
pub use sinks::{CsvSink, RowSink, SinkContext};
pub use study::{ResultsMatrix, ResultsReporter, Study};
pub use value::{MissingValue, Value};

/// Reads a CSV file, applies `mechanism` with a generator seeded by `seed`
/// (or from entropy when `None`), and returns the transformed dataset with
/// its mask.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the mechanism fails
/// validation.
pub fn inject_csv(
    path: &std::path::Path,
    options: &CsvReadOptions,
    mechanism: &Mechanism,
    seed: Option<u64>,
) -> Result<Injected> {
    let dataset = read_csv_path(path, options)?;
    let mut rng = seed.map_or_else(sampler::from_entropy, create_rng);
    mechanism.apply(&dataset, &mut rng)
}
