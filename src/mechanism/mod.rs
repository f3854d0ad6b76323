//! MCAR, MAR and NMAR missingness mechanisms.
//!
//! A [`Mechanism`] validates its parameters and columns, builds one trial
//! probability per row, and draws a [`MissingMask`]. Applying the mask writes
//! [`MissingValue::Injected`] into the target column in a single pass. All
//! validation happens before the dataset is touched.

mod inject;

use std::fmt;

use rand::Rng;
use serde::Serialize;

pub use inject::{DEFAULT_BETA, DEFAULT_MCAR_PROBABILITY, mar, mcar, nmar};

use crate::dataset::{Dataset, MissingMask};
use crate::error::{Error, Parameter, Result};
use crate::logger::log_warn;
use crate::probability::{DependentVariable, MissingProbability, NumericAssignment};
use crate::sampler::{BernoulliSampler, clamp_probability};
use crate::value::MissingValue;

/// Which mechanism produced a missing cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MechanismKind {
    #[serde(rename = "MCAR")]
    Mcar,
    #[serde(rename = "MAR")]
    Mar,
    #[serde(rename = "NMAR")]
    Nmar,
}

impl MechanismKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mcar => "MCAR",
            Self::Mar => "MAR",
            Self::Nmar => "NMAR",
        }
    }
}

impl fmt::Display for MechanismKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured missingness mechanism targeting one column.
#[derive(Debug, Clone, PartialEq)]
pub enum Mechanism {
    /// Every cell goes missing independently with probability `p`.
    Mcar { column: String, p: f64 },
    /// Probability driven by `dependent`, scaled by `beta`.
    Mar {
        column: String,
        dependent: String,
        beta: f64,
    },
    /// Probability driven by the cell's own value, scaled by `beta`.
    Nmar { column: String, beta: f64 },
}

/// Result of [`Mechanism::apply`]: a transformed copy plus the mask that
/// produced it.
#[derive(Debug, Clone)]
pub struct Injected {
    pub dataset: Dataset,
    pub mask: MissingMask,
    /// Cells that changed from present to missing.
    pub written: usize,
}

impl Mechanism {
    pub fn mcar(column: impl Into<String>, p: f64) -> Self {
        Self::Mcar {
            column: column.into(),
            p,
        }
    }

    pub fn mar(column: impl Into<String>, dependent: impl Into<String>, beta: f64) -> Self {
        Self::Mar {
            column: column.into(),
            dependent: dependent.into(),
            beta,
        }
    }

    pub fn nmar(column: impl Into<String>, beta: f64) -> Self {
        Self::Nmar {
            column: column.into(),
            beta,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> MechanismKind {
        match self {
            Self::Mcar { .. } => MechanismKind::Mcar,
            Self::Mar { .. } => MechanismKind::Mar,
            Self::Nmar { .. } => MechanismKind::Nmar,
        }
    }

    /// Column that receives the missing marker.
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::Mcar { column, .. } | Self::Mar { column, .. } | Self::Nmar { column, .. } => {
                column
            }
        }
    }

    /// Column the probability depends on. `None` for MCAR.
    #[must_use]
    pub fn dependent(&self) -> Option<&str> {
        match self {
            Self::Mcar { .. } => None,
            Self::Mar { dependent, .. } => Some(dependent),
            Self::Nmar { column, .. } => Some(column),
        }
    }

    /// Human readable label, e.g. `MAR(sales | region)`.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Mcar { column, p } => format!("MCAR({column}, p={p})"),
            Self::Mar {
                column,
                dependent,
                beta,
            } => format!("MAR({column} | {dependent}, b={beta})"),
            Self::Nmar { column, beta } => format!("NMAR({column}, b={beta})"),
        }
    }

    /// Checks the tuning parameter, then the referenced columns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParameterOutOfRange`] if `p` or `beta` lies outside
    /// `[0, 1]` (including `NaN`), and [`Error::ColumnNotFound`] if a
    /// referenced column is absent.
    pub fn validate(&self, dataset: &Dataset) -> Result<()> {
        let (parameter, value) = match self {
            Self::Mcar { p, .. } => (Parameter::Probability, *p),
            Self::Mar { beta, .. } | Self::Nmar { beta, .. } => (Parameter::Beta, *beta),
        };
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::ParameterOutOfRange { parameter, value });
        }
        dataset.column(self.target())?;
        if let Some(dependent) = self.dependent() {
            dataset.column(dependent)?;
        }
        Ok(())
    }

    /// Conditions that make the mechanism behave differently from its name:
    /// MAR depending on its own target, or a numeric dependent column with no
    /// spread. Consumes no randomness.
    ///
    /// # Errors
    ///
    /// See [`Mechanism::validate`].
    pub fn diagnostics(&self, dataset: &Dataset) -> Result<Vec<String>> {
        self.validate(dataset)?;
        let mut notes = Vec::new();
        if let Self::Mar {
            column,
            dependent,
            ..
        } = self
            && column == dependent
        {
            notes.push(format!("MAR on '{column}' depends on itself; this behaves like NMAR"));
        }
        if let Some(dependent) = self.dependent()
            && let DependentVariable::Numeric(values) =
                DependentVariable::resolve(dataset.column(dependent)?)
            && NumericAssignment::fit(values).is_degenerate()
        {
            notes.push(format!(
                "column '{dependent}' has zero variance; using z = 0 for every row"
            ));
        }
        Ok(notes)
    }

    fn log_diagnostics(&self, dataset: &Dataset) -> Result<()> {
        for note in self.diagnostics(dataset)? {
            log_warn(&note);
        }
        Ok(())
    }

    /// Per-row trial probabilities, clamped to `[0, 1]`.
    ///
    /// For categorical dependents this draws one normal sample per distinct
    /// value from `rng`; MCAR and numeric dependents consume no randomness.
    /// Anything reported by [`Mechanism::diagnostics`] is logged as a warning.
    ///
    /// # Errors
    ///
    /// See [`Mechanism::validate`].
    pub fn probabilities<R: Rng + ?Sized>(
        &self,
        dataset: &Dataset,
        rng: &mut R,
    ) -> Result<Vec<f64>> {
        self.log_diagnostics(dataset)?;
        self.trial_probabilities(dataset, rng)
    }

    fn trial_probabilities<R: Rng + ?Sized>(
        &self,
        dataset: &Dataset,
        rng: &mut R,
    ) -> Result<Vec<f64>> {
        self.validate(dataset)?;
        let (dependent, beta) = match self {
            Self::Mcar { p, .. } => {
                return Ok(vec![clamp_probability(*p); dataset.row_count()]);
            }
            Self::Mar {
                dependent,
                beta,
                ..
            } => (dependent.as_str(), *beta),
            Self::Nmar { column, beta } => (column.as_str(), *beta),
        };

        let variable = DependentVariable::resolve(dataset.column(dependent)?);
        let assignment = variable.assign(rng);
        Ok(variable
            .values()
            .iter()
            .map(|value| clamp_probability(assignment.probability_for(value) * beta))
            .collect())
    }

    /// Draws the missingness mask without touching the dataset.
    ///
    /// # Errors
    ///
    /// See [`Mechanism::validate`].
    pub fn mask<R: Rng + ?Sized>(&self, dataset: &Dataset, rng: &mut R) -> Result<MissingMask> {
        self.log_diagnostics(dataset)?;
        self.trial_mask(dataset, rng)
    }

    fn trial_mask<R: Rng + ?Sized>(&self, dataset: &Dataset, rng: &mut R) -> Result<MissingMask> {
        let probabilities = self.trial_probabilities(dataset, rng)?;
        Ok(BernoulliSampler::new(rng).mask(probabilities))
    }

    /// Draws a mask and writes the missing marker into `dataset`.
    ///
    /// # Errors
    ///
    /// See [`Mechanism::validate`]. On error the dataset is unchanged.
    pub fn apply_in_place<R: Rng + ?Sized>(
        &self,
        dataset: &mut Dataset,
        rng: &mut R,
    ) -> Result<MissingMask> {
        let mask = self.mask(dataset, rng)?;
        dataset.apply_mask(self.target(), &mask, MissingValue::Injected(self.kind()))?;
        Ok(mask)
    }

    /// Produces a transformed copy of `dataset`; the input is left untouched.
    ///
    /// # Errors
    ///
    /// See [`Mechanism::validate`].
    pub fn apply<R: Rng + ?Sized>(&self, dataset: &Dataset, rng: &mut R) -> Result<Injected> {
        self.log_diagnostics(dataset)?;
        self.apply_quiet(dataset, rng)
    }

    /// [`Mechanism::apply`] without logging diagnostics, for callers that
    /// report them once up front.
    pub(crate) fn apply_quiet<R: Rng + ?Sized>(
        &self,
        dataset: &Dataset,
        rng: &mut R,
    ) -> Result<Injected> {
        let mask = self.trial_mask(dataset, rng)?;
        let mut transformed = dataset.clone();
        let written =
            transformed.apply_mask(self.target(), &mask, MissingValue::Injected(self.kind()))?;
        Ok(Injected {
            dataset: transformed,
            mask,
            written,
        })
    }
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;
    use crate::probability::sigmoid;
    use crate::sampler::{create_rng, standard_normal};

    fn stores() -> Dataset {
        Dataset::new(vec![
            Column::text("region", ["A", "A", "B", "B"]),
            Column::float("sales", [5.0, 7.0, 11.0, 13.0]),
            Column::float("flat", [2.0, 2.0, 2.0, 2.0]),
        ])
        .unwrap()
    }

    #[test]
    fn parameters_are_validated_before_columns() {
        let dataset = stores();
        let err = Mechanism::mcar("nope", 1.5).validate(&dataset).unwrap_err();
        assert!(matches!(
            err,
            Error::ParameterOutOfRange {
                parameter: Parameter::Probability,
                ..
            }
        ));
        let err = Mechanism::nmar("sales", f64::NAN).validate(&dataset).unwrap_err();
        assert!(matches!(
            err,
            Error::ParameterOutOfRange {
                parameter: Parameter::Beta,
                ..
            }
        ));
    }

    #[test]
    fn both_mar_columns_must_exist() {
        let dataset = stores();
        let err = Mechanism::mar("sales", "segment", 0.5)
            .validate(&dataset)
            .unwrap_err();
        assert_eq!(err.to_string(), "column 'segment' not found");
        let err = Mechanism::mar("profit", "region", 0.5)
            .validate(&dataset)
            .unwrap_err();
        assert_eq!(err.to_string(), "column 'profit' not found");
    }

    #[test]
    fn mcar_probabilities_are_constant() {
        let dataset = stores();
        let mut rng = create_rng(0);
        let probabilities = Mechanism::mcar("sales", 0.2)
            .probabilities(&dataset, &mut rng)
            .unwrap();
        assert_eq!(probabilities, vec![0.2; 4]);
    }

    #[test]
    fn mar_categorical_probabilities_follow_draw_order() {
        let dataset = stores();
        let mut rng = create_rng(21);
        let probabilities = Mechanism::mar("sales", "region", 0.5)
            .probabilities(&dataset, &mut rng)
            .unwrap();

        let mut replay = create_rng(21);
        let a = sigmoid(standard_normal(&mut replay)) * 0.5;
        let b = sigmoid(standard_normal(&mut replay)) * 0.5;
        assert_eq!(probabilities, vec![a, a, b, b]);
    }

    #[test]
    fn zero_variance_dependent_gives_half_beta() {
        let dataset = stores();
        let mut rng = create_rng(3);
        let probabilities = Mechanism::mar("sales", "flat", 0.8)
            .probabilities(&dataset, &mut rng)
            .unwrap();
        for p in probabilities {
            assert!((p - 0.4).abs() < 1e-12);
        }
    }

    #[test]
    fn mar_on_itself_matches_nmar() {
        let dataset = stores();
        let mar = Mechanism::mar("sales", "sales", 0.5)
            .mask(&dataset, &mut create_rng(8))
            .unwrap();
        let nmar = Mechanism::nmar("sales", 0.5)
            .mask(&dataset, &mut create_rng(8))
            .unwrap();
        assert_eq!(mar, nmar);
    }

    #[test]
    fn apply_leaves_input_untouched() {
        let dataset = stores();
        let mut rng = create_rng(1);
        let injected = Mechanism::mcar("sales", 1.0).apply(&dataset, &mut rng).unwrap();
        assert_eq!(injected.written, 4);
        assert_eq!(injected.mask.count(), 4);
        assert_eq!(dataset.missing_count("sales").unwrap(), 0);
        assert_eq!(injected.dataset.missing_count("sales").unwrap(), 4);
        assert_eq!(
            injected.dataset.column("sales").unwrap().values()[0],
            crate::value::Value::Missing(MissingValue::Injected(MechanismKind::Mcar))
        );
    }

    #[test]
    fn diagnostics_flag_degenerate_and_self_dependent_mechanisms() {
        let dataset = stores();
        let notes = Mechanism::nmar("flat", 0.5).diagnostics(&dataset).unwrap();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].contains("zero variance"));

        let notes = Mechanism::mar("sales", "sales", 0.5)
            .diagnostics(&dataset)
            .unwrap();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].contains("depends on itself"));

        let quiet = Mechanism::mar("sales", "region", 0.5).diagnostics(&dataset);
        assert!(quiet.unwrap().is_empty());
        let quiet = Mechanism::mcar("flat", 0.5).diagnostics(&dataset);
        assert!(quiet.unwrap().is_empty());
        assert!(Mechanism::nmar("flat", 2.0).diagnostics(&dataset).is_err());
    }

    #[test]
    fn labels() {
        assert_eq!(
            Mechanism::mar("sales", "region", 0.5).label(),
            "MAR(sales | region, b=0.5)"
        );
        assert_eq!(Mechanism::nmar("sales", 1.0).label(), "NMAR(sales, b=1)");
        assert_eq!(Mechanism::mcar("sales", 0.2).kind().to_string(), "MCAR");
    }
}
