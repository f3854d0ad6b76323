use std::fmt;

use crate::mechanism::MechanismKind;

/// Represents a single cell of a [`Dataset`](crate::dataset::Dataset) column.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 64-bit floating point number.
    Float(f64),
    /// 64-bit signed integer.
    Integer(i64),
    /// Boolean flag; treated as categorical by the probability model.
    Boolean(bool),
    /// Free-form text or a category label.
    Text(String),
    /// Missing value with additional context.
    Missing(MissingValue),
}

impl Value {
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing(_))
    }

    /// Returns the numeric interpretation of the cell, if it has one.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Missing(_) => f.write_str("NaN"),
        }
    }
}

/// Provenance of a missing cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissingValue {
    /// Missing in the source data.
    System,
    /// Written by a missingness mechanism.
    Injected(MechanismKind),
}

impl MissingValue {
    #[must_use]
    pub const fn is_injected(&self) -> bool {
        matches!(self, Self::Injected(_))
    }
}
