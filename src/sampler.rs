//! Random source handling and Bernoulli trials.
//!
//! Every mechanism draws from an explicitly passed generator. For
//! reproducible runs use [`create_rng`] with a fixed seed: `ChaCha8` produces
//! the same stream on every platform.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

use crate::dataset::MissingMask;

/// Generator type handed out by [`create_rng`] and [`from_entropy`].
pub type MissRng = ChaCha8Rng;

/// Creates a seeded generator.
#[must_use]
pub fn create_rng(seed: u64) -> MissRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Creates a generator seeded from the thread-local entropy source.
#[must_use]
pub fn from_entropy() -> MissRng {
    ChaCha8Rng::from_rng(&mut rand::rng())
}

/// Draws one sample from the standard normal distribution.
///
/// The number of values taken from `rng` varies per draw (Ziggurat), but the
/// sequence is fixed for a given generator state.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.sample(StandardNormal)
}

/// Clamps a probability into `[0, 1]`. `NaN` becomes `0`.
#[must_use]
pub fn clamp_probability(probability: f64) -> f64 {
    if probability.is_nan() {
        0.0
    } else {
        probability.clamp(0.0, 1.0)
    }
}

/// Weighted coin flips over a borrowed generator.
pub struct BernoulliSampler<'r, R: Rng + ?Sized> {
    rng: &'r mut R,
}

impl<'r, R: Rng + ?Sized> BernoulliSampler<'r, R> {
    pub const fn new(rng: &'r mut R) -> Self {
        Self { rng }
    }

    /// Single trial: `true` with the given probability.
    ///
    /// The probability is clamped first, so `0` never fires and `1` always
    /// fires. One uniform is consumed regardless of the probability.
    pub fn draw(&mut self, probability: f64) -> bool {
        let probability = clamp_probability(probability);
        self.rng.random::<f64>() < probability
    }

    /// One trial per probability, in order.
    pub fn mask<I>(&mut self, probabilities: I) -> MissingMask
    where
        I: IntoIterator<Item = f64>,
    {
        probabilities.into_iter().map(|p| self.draw(p)).collect()
    }
}
