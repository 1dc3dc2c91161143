//! Randomness sources for observation generation.
//!
//! The generator never touches a global RNG. It draws through the
//! [`RandomSource`] trait so the engine can run on a seeded
//! [`SmallRng`](rand::rngs::SmallRng) while tests script exact values with
//! [`SequenceSource`].

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Errors a randomness source can report.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RandomError {
    /// A scripted source ran out of values.
    #[error("random source exhausted")]
    Exhausted,

    /// The requested range cannot be sampled.
    #[error("invalid sampling range [{low}, {high}]")]
    InvalidRange {
        /// Requested lower bound.
        low: f64,
        /// Requested upper bound.
        high: f64,
    },
}

/// A source of uniformly distributed values.
pub trait RandomSource: Send {
    /// Draw an integer uniformly from `[0, max]` inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`RandomError`] if the source cannot produce a value.
    fn count(&mut self, max: u32) -> Result<u32, RandomError>;

    /// Draw a real value uniformly from `[low, high]`.
    ///
    /// # Errors
    ///
    /// Returns [`RandomError::InvalidRange`] for a non-finite or inverted
    /// range, or another [`RandomError`] if the source cannot produce a
    /// value.
    fn uniform(&mut self, low: f64, high: f64) -> Result<f64, RandomError>;
}

/// [`RandomSource`] backed by any [`rand::Rng`].
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R> RngSource<R> {
    /// Wrap an existing generator.
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<SmallRng> {
    /// A deterministic source: the same seed yields the same observations.
    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }

    /// A source seeded from operating-system entropy.
    pub fn from_os() -> Self {
        Self::new(SmallRng::from_os_rng())
    }
}

impl<R: Rng + Send> RandomSource for RngSource<R> {
    fn count(&mut self, max: u32) -> Result<u32, RandomError> {
        Ok(self.rng.random_range(0..=max))
    }

    fn uniform(&mut self, low: f64, high: f64) -> Result<f64, RandomError> {
        check_range(low, high)?;
        Ok(self.rng.random_range(low..=high))
    }
}

/// Scripted [`RandomSource`] that replays fixed values in order.
///
/// Counts above the requested maximum are clamped to it and reals are
/// clamped into the requested range, so scripts stay valid across
/// catalogs. Once a queue is empty every further draw of that kind fails
/// with [`RandomError::Exhausted`].
#[derive(Debug, Clone, Default)]
pub struct SequenceSource {
    counts: VecDeque<u32>,
    reals: VecDeque<f64>,
}

impl SequenceSource {
    /// Create a source that replays `counts` and `reals`.
    pub fn new(counts: impl IntoIterator<Item = u32>, reals: impl IntoIterator<Item = f64>) -> Self {
        Self {
            counts: counts.into_iter().collect(),
            reals: reals.into_iter().collect(),
        }
    }
}

impl RandomSource for SequenceSource {
    fn count(&mut self, max: u32) -> Result<u32, RandomError> {
        self.counts
            .pop_front()
            .map(|value| value.min(max))
            .ok_or(RandomError::Exhausted)
    }

    fn uniform(&mut self, low: f64, high: f64) -> Result<f64, RandomError> {
        check_range(low, high)?;
        self.reals
            .pop_front()
            .map(|value| value.clamp(low, high))
            .ok_or(RandomError::Exhausted)
    }
}

fn check_range(low: f64, high: f64) -> Result<(), RandomError> {
    if low.is_finite() && high.is_finite() && low <= high {
        Ok(())
    } else {
        Err(RandomError::InvalidRange { low, high })
    }
}
