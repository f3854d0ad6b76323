use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::value::{MissingValue, Value};

/// Declared storage type of a column.
///
/// The kind never changes when cells are overwritten with the missing
/// marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Float,
    Integer,
    Boolean,
    Text,
}

impl ColumnKind {
    /// Boolean and text columns are treated as categorical; everything else
    /// is numeric.
    #[must_use]
    pub const fn is_categorical(self) -> bool {
        matches!(self, Self::Boolean | Self::Text)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Text => "text",
        }
    }

    const fn admits(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Missing(_))
                | (Self::Float, Value::Float(_))
                | (Self::Integer, Value::Integer(_))
                | (Self::Boolean, Value::Boolean(_))
                | (Self::Text, Value::Text(_))
        )
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed sequence of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    kind: ColumnKind,
    values: Vec<Value>,
}

impl Column {
    /// Creates a column, checking that every cell matches `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] if a non-missing cell has a different
    /// type than the declared kind.
    pub fn new(name: impl Into<String>, kind: ColumnKind, values: Vec<Value>) -> Result<Self> {
        let name = name.into();
        if let Some(row) = values.iter().position(|value| !kind.admits(value)) {
            return Err(Error::InvalidData {
                details: Cow::Owned(format!(
                    "column '{name}' is declared {kind} but row {row} holds {:?}",
                    values[row]
                )),
            });
        }
        Ok(Self { name, kind, values })
    }

    /// Builds a float column. `NaN` entries become source-missing cells.
    #[must_use]
    pub fn float<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let values = values
            .into_iter()
            .map(|v| {
                if v.is_nan() {
                    Value::Missing(MissingValue::System)
                } else {
                    Value::Float(v)
                }
            })
            .collect();
        Self {
            name: name.into(),
            kind: ColumnKind::Float,
            values,
        }
    }

    #[must_use]
    pub fn integer<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        Self {
            name: name.into(),
            kind: ColumnKind::Integer,
            values: values.into_iter().map(Value::Integer).collect(),
        }
    }

    #[must_use]
    pub fn boolean<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        Self {
            name: name.into(),
            kind: ColumnKind::Boolean,
            values: values.into_iter().map(Value::Boolean).collect(),
        }
    }

    #[must_use]
    pub fn text<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind: ColumnKind::Text,
            values: values.into_iter().map(|s| Value::Text(s.into())).collect(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> ColumnKind {
        self.kind
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    /// Counts cells written by a missingness mechanism.
    #[must_use]
    pub fn injected_count(&self) -> usize {
        self.values
            .iter()
            .filter(|v| matches!(v, Value::Missing(m) if m.is_injected()))
            .count()
    }

    /// Numeric values of the non-missing cells, in row order. Empty for
    /// categorical columns.
    #[must_use]
    pub fn observed_f64(&self) -> Vec<f64> {
        self.values.iter().filter_map(Value::as_f64).collect()
    }

    /// Overwrites a cell with the missing marker. Returns `true` when the cell
    /// was not already missing.
    pub(crate) fn mark_missing(&mut self, row: usize, marker: MissingValue) -> bool {
        match self.values.get_mut(row) {
            Some(cell) if !cell.is_missing() => {
                *cell = Value::Missing(marker);
                true
            }
            _ => false,
        }
    }
}
