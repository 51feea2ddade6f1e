//! Bounded combatant attributes that clamp on every write.

use serde::{Deserialize, Serialize};

/// Closed numeric range that an attribute is clamped into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttributeRange {
    min: f64,
    max: f64,
}

impl AttributeRange {
    /// Creates a new inclusive range.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Lowest value permitted by the range.
    #[must_use]
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// Highest value permitted by the range.
    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Reports whether the value already lies inside the range.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Snaps the value into the range. `NaN` collapses to the minimum.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }
}

/// Permitted health values.
pub const HEALTH_RANGE: AttributeRange = AttributeRange::new(0.0, 100.0);
/// Permitted strength values.
pub const STRENGTH_RANGE: AttributeRange = AttributeRange::new(20.0, 100.0);
/// Permitted speed values.
pub const SPEED_RANGE: AttributeRange = AttributeRange::new(20.0, 100.0);
/// Permitted stealth values for stealth-bearing kinds.
pub const STEALTH_RANGE: AttributeRange = AttributeRange::new(0.0, 50.0);

macro_rules! bounded_attribute {
    ($(#[$meta:meta])* $name:ident, $range:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
        #[serde(from = "f64", into = "f64")]
        pub struct $name(f64);

        impl $name {
            /// Range every stored value is clamped into.
            pub const RANGE: AttributeRange = $range;

            /// Creates the attribute, clamping out-of-range input.
            #[must_use]
            pub fn new(value: f64) -> Self {
                Self(Self::RANGE.clamp(value))
            }

            /// Retrieves the stored value.
            #[must_use]
            pub const fn get(&self) -> f64 {
                self.0
            }
        }

        impl From<f64> for $name {
            fn from(value: f64) -> Self {
                Self::new(value)
            }
        }

        impl From<$name> for f64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

bounded_attribute!(
    /// Remaining health of a combatant, clamped to `[0, 100]`.
    Health,
    HEALTH_RANGE
);

bounded_attribute!(
    /// Striking power of a combatant, clamped to `[20, 100]`.
    Strength,
    STRENGTH_RANGE
);

bounded_attribute!(
    /// Movement rate of a combatant, clamped to `[20, 100]`.
    Speed,
    SPEED_RANGE
);

bounded_attribute!(
    /// Concealment of stealth-bearing kinds, clamped to `[0, 50]`.
    Stealth,
    STEALTH_RANGE
);

impl Health {
    /// Reports whether the combatant has no health left.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.0 <= 0.0
    }

    /// Subtracts damage, rounding the result to one decimal place.
    ///
    /// Rounding never raises health above its value before the hit.
    #[must_use]
    pub fn after_damage(self, damage: f64) -> Self {
        Self::new(round_to_tenth(self.0 - damage).min(self.0))
    }
}

/// Rounds a value to one decimal place.
#[must_use]
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
