use std::borrow::Cow;
use std::fmt;
use std::io;

/// Result type used across the missingness toolkit.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type surfaced by dataset construction, mechanism validation and I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O failure while reading or writing a delimited file.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A tuning parameter fell outside the closed interval `[0, 1]`.
    #[error("{parameter} must be between 0 and 1, got {value}")]
    ParameterOutOfRange { parameter: Parameter, value: f64 },

    /// A referenced column does not exist in the dataset.
    #[error("column '{name}' not found")]
    ColumnNotFound { name: Cow<'static, str> },

    /// Two columns in the same dataset share a name.
    #[error("duplicate column '{name}'")]
    DuplicateColumn { name: Cow<'static, str> },

    /// A column's length disagrees with the dataset's row count.
    #[error("column '{column}' has {found} rows, expected {expected}")]
    LengthMismatch {
        column: Cow<'static, str>,
        expected: usize,
        found: usize,
    },

    /// Input data could not be interpreted as a dataset.
    #[error("invalid data: {details}")]
    InvalidData { details: Cow<'static, str> },

    /// Failure reported by the CSV reader or writer.
    #[error("csv error: {details}")]
    Csv { details: Cow<'static, str> },

    /// Failure serialising a report to JSON.
    #[error("json error: {details}")]
    Json { details: Cow<'static, str> },
}

impl Error {
    pub(crate) fn column_not_found(name: &str) -> Self {
        Self::ColumnNotFound {
            name: Cow::Owned(name.to_owned()),
        }
    }
}

/// Tuning parameter named in range errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    /// MCAR probability `p`.
    Probability,
    /// MAR/NMAR scaling factor `beta`.
    Beta,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Probability => write!(f, "probability of missing values"),
            Self::Beta => write!(f, "beta value"),
        }
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Self::Csv {
            details: Cow::Owned(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            details: Cow::Owned(err.to_string()),
        }
    }
}
