use super::{MissingProbability, sigmoid};
use crate::value::Value;

/// Z-score model for a numeric dependent column.
///
/// Holds the mean and population standard deviation of the observed values.
/// A column without spread (constant, or no observed values) is degenerate:
/// every z-score is `0` and every row gets `sigmoid(0) = 0.5`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericAssignment {
    mean: f64,
    std_dev: Option<f64>,
}

impl NumericAssignment {
    /// Fits the model over the non-missing cells of `values`.
    #[must_use]
    pub fn fit(values: &[Value]) -> Self {
        let mut moments = Moments::default();
        for value in values.iter().filter_map(Value::as_f64) {
            moments.update(value);
        }
        Self::from_moments(&moments)
    }

    /// Builds the model from precomputed statistics.
    #[must_use]
    pub fn new(mean: f64, std_dev: f64) -> Self {
        let std_dev = (std_dev.is_finite() && std_dev > 0.0).then_some(std_dev);
        Self {
            mean: if mean.is_finite() { mean } else { 0.0 },
            std_dev,
        }
    }

    fn from_moments(moments: &Moments) -> Self {
        match moments.population_std_dev() {
            Some(std_dev) => Self::new(moments.mean, std_dev),
            None => Self::new(moments.mean, 0.0),
        }
    }

    #[must_use]
    pub const fn mean(&self) -> f64 {
        self.mean
    }

    /// Population standard deviation, or `None` for a degenerate column.
    #[must_use]
    pub const fn std_dev(&self) -> Option<f64> {
        self.std_dev
    }

    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        self.std_dev.is_none()
    }

    /// `(value - mean) / std`, or `0` when the column has no spread.
    #[must_use]
    pub fn z_score(&self, value: f64) -> f64 {
        self.std_dev.map_or(0.0, |std_dev| (value - self.mean) / std_dev)
    }
}

impl MissingProbability for NumericAssignment {
    /// Missing cells in the dependent column sit at the mean (z = 0).
    fn probability_for(&self, value: &Value) -> f64 {
        sigmoid(value.as_f64().map_or(0.0, |v| self.z_score(v)))
    }
}

/// Welford running mean and sum of squared deviations.
#[derive(Debug, Default)]
struct Moments {
    count: u64,
    mean: f64,
    m2: f64,
}

impl Moments {
    #[allow(clippy::cast_precision_loss)]
    fn update(&mut self, x: f64) {
        if !x.is_finite() {
            return;
        }
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    #[allow(clippy::cast_precision_loss)]
    fn population_std_dev(&self) -> Option<f64> {
        (self.count > 0).then(|| (self.m2 / self.count as f64).max(0.0).sqrt())
    }
}
