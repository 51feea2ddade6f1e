//! Bell-shaped draws confined to a closed range.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use thiserror::Error;

/// Errors raised when a sampler is configured with unusable parameters.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum SamplerError {
    /// The spread lies outside `[1.0, 5.0]`.
    #[error("spread {spread} must lie within [1.0, 5.0]")]
    InvalidSpread {
        /// Rejected spread.
        spread: f64,
    },
    /// The bounds are not finite or are inverted.
    #[error("range [{low}, {high}] is empty or not finite")]
    InvalidRange {
        /// Rejected lower bound.
        low: f64,
        /// Rejected upper bound.
        high: f64,
    },
}

/// Normal distribution centred on the middle of `[low, high]` that redraws
/// until a value lands inside the range.
///
/// Larger spreads cluster draws more tightly around the mean: the standard
/// deviation is `(high - low + 1) / (2 * spread)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundedNormal {
    low: f64,
    high: f64,
    mean: f64,
    std_dev: f64,
}

impl BoundedNormal {
    /// Smallest accepted spread.
    pub const MIN_SPREAD: f64 = 1.0;
    /// Largest accepted spread.
    pub const MAX_SPREAD: f64 = 5.0;

    /// Creates a sampler over `[low, high]`.
    pub fn new(low: f64, high: f64, spread: f64) -> Result<Self, SamplerError> {
        if !(Self::MIN_SPREAD..=Self::MAX_SPREAD).contains(&spread) {
            return Err(SamplerError::InvalidSpread { spread });
        }
        if !low.is_finite() || !high.is_finite() || low > high {
            return Err(SamplerError::InvalidRange { low, high });
        }

        Ok(Self {
            low,
            high,
            mean: (low + high) / 2.0,
            std_dev: (high - low + 1.0) / (2.0 * spread),
        })
    }
}

impl Distribution<f64> for BoundedNormal {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.low == self.high {
            return self.low;
        }
        loop {
            let z: f64 = StandardNormal.sample(rng);
            let value = z * self.std_dev + self.mean;
            if value >= self.low && value <= self.high {
                return value;
            }
        }
    }
}
