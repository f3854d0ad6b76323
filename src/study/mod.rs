//! Repeated, seeded comparison of mechanisms on one target column.
//!
//! A study always starts with a "No Missing" baseline row followed by one row
//! per mechanism. Each cell of the resulting [`ResultsMatrix`] is a metric
//! averaged over the trials of that row where it is defined. Trials are
//! independent: every trial owns a copy of the dataset and a generator seeded
//! from the study seed, the row and the trial index, so they run on the rayon
//! pool and still reproduce exactly. Mechanism diagnostics are logged once per
//! row, before its trials start.

mod report;

use std::borrow::Cow;

use rayon::prelude::*;
use serde::Serialize;

pub use report::{CsvReporter, JsonReporter, ResultsReporter, TextReporter};

use crate::dataset::{Column, Dataset};
use crate::error::{Error, Result};
use crate::logger::{log_warn, set_log_prefix};
use crate::mechanism::Mechanism;
use crate::sampler::create_rng;

/// Label of the baseline row.
pub const BASELINE_LABEL: &str = "No Missing";

/// Outcome measured on the target column after injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Metric {
    /// Cells written by the mechanism.
    Injected,
    /// Share of missing cells, source-missing included.
    MissingRate,
    /// Mean of the values still observed. `NaN` for categorical targets.
    ObservedMean,
    /// Observed mean minus the complete-data mean.
    MeanShift,
    /// Population standard deviation of the observed values.
    ObservedStd,
}

impl Metric {
    pub const ALL: [Self; 5] = [
        Self::Injected,
        Self::MissingRate,
        Self::ObservedMean,
        Self::MeanShift,
        Self::ObservedStd,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Injected => "injected",
            Self::MissingRate => "missing_rate",
            Self::ObservedMean => "observed_mean",
            Self::MeanShift => "mean_shift",
            Self::ObservedStd => "observed_std",
        }
    }
}

/// Rows are mechanisms (baseline first), columns are metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsMatrix {
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl ResultsMatrix {
    #[must_use]
    pub fn get(&self, row: usize, metric: Metric) -> Option<f64> {
        let column = Metric::ALL.iter().position(|&m| m == metric)?;
        self.values.get(row)?.get(column).copied()
    }

    /// Row index for a label.
    #[must_use]
    pub fn row_index(&self, label: &str) -> Option<usize> {
        self.row_labels.iter().position(|l| l == label)
    }

    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.row_labels.len(), self.column_labels.len())
    }
}

/// Configured comparison of mechanisms on one column.
#[derive(Debug, Clone)]
pub struct Study {
    dataset: Dataset,
    target: String,
    mechanisms: Vec<Mechanism>,
    trials: usize,
    seed: u64,
}

impl Study {
    pub fn new(dataset: Dataset, target: impl Into<String>) -> Self {
        Self {
            dataset,
            target: target.into(),
            mechanisms: Vec::new(),
            trials: 100,
            seed: 0,
        }
    }

    #[must_use]
    pub fn with_mechanism(mut self, mechanism: Mechanism) -> Self {
        self.mechanisms.push(mechanism);
        self
    }

    /// Adds MCAR, MAR (only when a dependent column is given) and NMAR rows
    /// for the study target.
    #[must_use]
    pub fn with_standard_mechanisms(mut self, dependent: Option<&str>, p: f64, beta: f64) -> Self {
        self.mechanisms.push(Mechanism::mcar(self.target.clone(), p));
        if let Some(dependent) = dependent {
            self.mechanisms
                .push(Mechanism::mar(self.target.clone(), dependent, beta));
        }
        self.mechanisms.push(Mechanism::nmar(self.target.clone(), beta));
        self
    }

    #[must_use]
    pub const fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Runs every trial and averages the metrics per row.
    ///
    /// # Errors
    ///
    /// Returns an error if `trials` is zero, a mechanism targets a different
    /// column than the study, or a mechanism fails validation. Nothing runs
    /// unless every mechanism validates.
    pub fn run(&self) -> Result<ResultsMatrix> {
        if self.trials == 0 {
            return Err(Error::InvalidData {
                details: Cow::from("a study needs at least one trial"),
            });
        }
        let complete = self.dataset.column(&self.target)?;
        for mechanism in &self.mechanisms {
            if mechanism.target() != self.target {
                return Err(Error::InvalidData {
                    details: Cow::Owned(format!(
                        "{mechanism} targets '{}' but the study targets '{}'",
                        mechanism.target(),
                        self.target
                    )),
                });
            }
            mechanism.validate(&self.dataset)?;
        }

        let baseline = ColumnMetrics::measure(complete);
        let mut row_labels = vec![BASELINE_LABEL.to_owned()];
        let mut values = vec![baseline.row(&baseline)];

        for (row, mechanism) in self.mechanisms.iter().enumerate() {
            let label = mechanism.label();
            {
                let _prefix = set_log_prefix(label.clone());
                for note in mechanism.diagnostics(&self.dataset)? {
                    log_warn(&note);
                }
            }
            let trials = (0..self.trials)
                .into_par_iter()
                .map(|trial| self.run_trial(mechanism, row, trial, &baseline))
                .collect::<Result<Vec<_>>>()?;
            values.push(average(&trials));
            row_labels.push(label);
        }

        Ok(ResultsMatrix {
            row_labels,
            column_labels: Metric::ALL.iter().map(|m| m.label().to_owned()).collect(),
            values,
        })
    }

    fn run_trial(
        &self,
        mechanism: &Mechanism,
        row: usize,
        trial: usize,
        baseline: &ColumnMetrics,
    ) -> Result<Vec<f64>> {
        let mut rng = create_rng(self.trial_seed(row, trial));
        let injected = mechanism.apply_quiet(&self.dataset, &mut rng)?;
        let column = injected.dataset.column(&self.target)?;
        Ok(ColumnMetrics::measure(column).row(baseline))
    }

    fn trial_seed(&self, row: usize, trial: usize) -> u64 {
        let offset = (row as u64)
            .wrapping_mul(self.trials as u64)
            .wrapping_add(trial as u64);
        self.seed.wrapping_add(offset)
    }
}

/// Raw measurements of one column state.
#[derive(Debug, Clone, Copy)]
struct ColumnMetrics {
    injected: f64,
    missing_rate: f64,
    mean: f64,
    std_dev: f64,
}

impl ColumnMetrics {
    #[allow(clippy::cast_precision_loss)]
    fn measure(column: &Column) -> Self {
        let missing_rate = if column.is_empty() {
            0.0
        } else {
            column.missing_count() as f64 / column.len() as f64
        };
        let (mean, std_dev) = if column.kind().is_categorical() {
            (f64::NAN, f64::NAN)
        } else {
            moments(&column.observed_f64())
        };
        Self {
            injected: column.injected_count() as f64,
            missing_rate,
            mean,
            std_dev,
        }
    }

    fn row(&self, baseline: &Self) -> Vec<f64> {
        Metric::ALL
            .iter()
            .map(|metric| match metric {
                Metric::Injected => self.injected,
                Metric::MissingRate => self.missing_rate,
                Metric::ObservedMean => self.mean,
                Metric::MeanShift => self.mean - baseline.mean,
                Metric::ObservedStd => self.std_dev,
            })
            .collect()
    }
}

#[allow(clippy::cast_precision_loss)]
fn moments(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Column-wise mean of equally long rows, skipping `NaN` cells. A column that
/// is `NaN` in every row stays `NaN`.
#[allow(clippy::cast_precision_loss)]
fn average(rows: &[Vec<f64>]) -> Vec<f64> {
    let width = rows.first().map_or(0, Vec::len);
    (0..width)
        .map(|column| {
            let (sum, n) = rows
                .iter()
                .filter_map(|row| row.get(column).copied())
                .filter(|v| !v.is_nan())
                .fold((0.0, 0_usize), |(sum, n), v| (sum + v, n + 1));
            if n == 0 { f64::NAN } else { sum / n as f64 }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stores() -> Dataset {
        Dataset::new(vec![
            Column::text("region", ["A", "A", "B", "B", "C", "C"]),
            Column::float("sales", [10.0, 20.0, 30.0, 40.0, 50.0, 1000.0]),
        ])
        .unwrap()
    }

    #[test]
    fn baseline_row_comes_first() {
        let matrix = Study::new(stores(), "sales")
            .with_standard_mechanisms(Some("region"), 0.2, 0.5)
            .with_trials(8)
            .with_seed(99)
            .run()
            .unwrap();
        assert_eq!(matrix.shape(), (4, Metric::ALL.len()));
        assert_eq!(matrix.row_labels[0], BASELINE_LABEL);
        assert!(matrix.get(0, Metric::Injected).unwrap().abs() < f64::EPSILON);
        assert!(matrix.get(0, Metric::MeanShift).unwrap().abs() < f64::EPSILON);
        assert!((matrix.get(0, Metric::ObservedMean).unwrap() - 1150.0 / 6.0).abs() < 1e-9);
        assert_eq!(matrix.row_index("NMAR(sales, b=0.5)"), Some(3));
    }

    #[test]
    fn runs_are_reproducible() {
        let study = Study::new(stores(), "sales")
            .with_standard_mechanisms(Some("region"), 0.3, 0.7)
            .with_trials(16)
            .with_seed(5);
        let first = study.run().unwrap();
        let second = study.run().unwrap();
        assert_eq!(format!("{first:?}"), format!("{second:?}"));
    }

    #[test]
    fn certain_mcar_removes_everything() {
        let matrix = Study::new(stores(), "sales")
            .with_mechanism(Mechanism::mcar("sales", 1.0))
            .with_trials(4)
            .run()
            .unwrap();
        assert!((matrix.get(1, Metric::Injected).unwrap() - 6.0).abs() < f64::EPSILON);
        assert!((matrix.get(1, Metric::MissingRate).unwrap() - 1.0).abs() < f64::EPSILON);
        assert!(matrix.get(1, Metric::ObservedMean).unwrap().is_nan());
    }

    #[test]
    fn categorical_target_reports_nan_moments() {
        let matrix = Study::new(stores(), "region")
            .with_mechanism(Mechanism::nmar("region", 0.0))
            .with_trials(2)
            .run()
            .unwrap();
        assert!(matrix.get(1, Metric::ObservedMean).unwrap().is_nan());
        assert!(matrix.get(1, Metric::Injected).unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn mismatched_target_is_rejected() {
        let err = Study::new(stores(), "sales")
            .with_mechanism(Mechanism::mcar("region", 0.1))
            .run()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData { .. }));
    }

    #[test]
    fn invalid_mechanism_fails_before_running() {
        let err = Study::new(stores(), "sales")
            .with_mechanism(Mechanism::mar("sales", "segment", 0.5))
            .run()
            .unwrap_err();
        assert!(matches!(err, Error::ColumnNotFound { .. }));
    }

    #[test]
    fn average_skips_nan_trials() {
        let rows = vec![vec![1.0, f64::NAN], vec![3.0, f64::NAN], vec![f64::NAN, f64::NAN]];
        let averaged = average(&rows);
        assert!((averaged[0] - 2.0).abs() < f64::EPSILON);
        assert!(averaged[1].is_nan());
    }

    #[test]
    fn zero_trials_is_an_error() {
        assert!(Study::new(stores(), "sales").with_trials(0).run().is_err());
    }
}
