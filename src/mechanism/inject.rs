use rand::Rng;

use super::Mechanism;
use crate::dataset::Dataset;
use crate::error::Result;

/// Default MCAR probability.
pub const DEFAULT_MCAR_PROBABILITY: f64 = 0.2;
/// Default MAR/NMAR scaling factor.
pub const DEFAULT_BETA: f64 = 0.5;

/// Missing Completely At Random: each cell of `column` goes missing with
/// probability `p`, independent of every value.
///
/// Mutates `dataset` in place and hands it back for chaining.
///
/// # Errors
///
/// Returns a range error if `p` is outside `[0, 1]` and a lookup error if
/// `column` is absent. The dataset is unchanged on error.
pub fn mcar<'d, R: Rng + ?Sized>(
    dataset: &'d mut Dataset,
    column: &str,
    p: f64,
    rng: &mut R,
) -> Result<&'d mut Dataset> {
    Mechanism::mcar(column, p).apply_in_place(dataset, rng)?;
    Ok(dataset)
}

/// Missing At Random: the chance that a row's `miss_column` cell goes
/// missing follows that row's `dep_column` value, scaled by `beta`.
///
/// # Errors
///
/// Returns a range error if `beta` is outside `[0, 1]` and a lookup error if
/// either column is absent. The dataset is unchanged on error.
pub fn mar<'d, R: Rng + ?Sized>(
    dataset: &'d mut Dataset,
    miss_column: &str,
    dep_column: &str,
    beta: f64,
    rng: &mut R,
) -> Result<&'d mut Dataset> {
    Mechanism::mar(miss_column, dep_column, beta).apply_in_place(dataset, rng)?;
    Ok(dataset)
}

/// Not Missing At Random: the chance that a cell goes missing follows its
/// own value, scaled by `beta`.
///
/// # Errors
///
/// Returns a range error if `beta` is outside `[0, 1]` and a lookup error if
/// `column` is absent. The dataset is unchanged on error.
pub fn nmar<'d, R: Rng + ?Sized>(
    dataset: &'d mut Dataset,
    column: &str,
    beta: f64,
    rng: &mut R,
) -> Result<&'d mut Dataset> {
    Mechanism::nmar(column, beta).apply_in_place(dataset, rng)?;
    Ok(dataset)
}
