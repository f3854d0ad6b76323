//! Base probabilities of missingness derived from a dependent column.
//!
//! A dependent column is resolved once into a [`DependentVariable`]: boolean
//! and text columns are categorical, float and integer columns are numeric.
//! The resolved variable then yields a [`ProbabilityAssignment`] that maps
//! every cell to a probability in `[0, 1]`.

mod categorical;
mod numeric;

use rand::Rng;

pub use categorical::{CategoricalAssignment, CategoryKey};
pub use numeric::NumericAssignment;

use crate::dataset::Column;
use crate::value::Value;

/// Logistic function `1 / (1 + e^-x)`.
///
/// Mathematically the output lies in `(0, 1)`, but in `f64` it saturates to
/// exactly `1.0` for `x` above roughly 37 and to `0.0` below roughly -745.
#[must_use]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Capability shared by every probability model.
pub trait MissingProbability {
    /// Base probability that the row holding `value` goes missing.
    fn probability_for(&self, value: &Value) -> f64;
}

/// Dependent column tagged with the branch it takes.
#[derive(Debug, Clone, Copy)]
pub enum DependentVariable<'a> {
    Categorical(&'a [Value]),
    Numeric(&'a [Value]),
}

impl<'a> DependentVariable<'a> {
    #[must_use]
    pub fn resolve(column: &'a Column) -> Self {
        if column.kind().is_categorical() {
            Self::Categorical(column.values())
        } else {
            Self::Numeric(column.values())
        }
    }

    #[must_use]
    pub const fn values(&self) -> &'a [Value] {
        match self {
            Self::Categorical(values) | Self::Numeric(values) => *values,
        }
    }

    /// Builds the probability model. Only the categorical branch consumes
    /// randomness: one normal draw per distinct value.
    pub fn assign<R: Rng + ?Sized>(&self, rng: &mut R) -> ProbabilityAssignment {
        match self {
            Self::Categorical(values) => {
                ProbabilityAssignment::Categorical(CategoricalAssignment::draw(values, rng))
            }
            Self::Numeric(values) => ProbabilityAssignment::Numeric(NumericAssignment::fit(values)),
        }
    }
}

/// Probability model built for one mechanism invocation.
#[derive(Debug, Clone)]
pub enum ProbabilityAssignment {
    Categorical(CategoricalAssignment),
    Numeric(NumericAssignment),
}

impl MissingProbability for ProbabilityAssignment {
    fn probability_for(&self, value: &Value) -> f64 {
        match self {
            Self::Categorical(model) => model.probability_for(value),
            Self::Numeric(model) => model.probability_for(value),
        }
    }
}
