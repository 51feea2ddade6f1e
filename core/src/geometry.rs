//! Battlefield coordinates.

use serde::{Deserialize, Serialize};

/// Width of the battlefield measured in world units.
pub const BATTLEFIELD_WIDTH: f64 = 1000.0;
/// Height of the battlefield measured in world units.
pub const BATTLEFIELD_HEIGHT: f64 = 571.0;

/// Point on the battlefield.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f64,
    y: f64,
}

impl Position {
    /// Creates a position without applying battlefield bounds.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Creates a position clamped to `[0, 1000] x [0, 571]`.
    #[must_use]
    pub fn clamped(x: f64, y: f64) -> Self {
        Self {
            x: clamp_axis(x, BATTLEFIELD_WIDTH),
            y: clamp_axis(y, BATTLEFIELD_HEIGHT),
        }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.y
    }

    /// Returns this position snapped inside the battlefield bounds.
    #[must_use]
    pub fn clamp_to_battlefield(self) -> Self {
        Self::clamped(self.x, self.y)
    }

    /// Euclidean distance between two positions.
    #[must_use]
    pub fn distance_to(self, other: Position) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Point halfway between two positions.
    #[must_use]
    pub fn midpoint(self, other: Position) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Linear interpolation toward `other`; `t` is clamped to `[0, 1]`.
    #[must_use]
    pub fn lerp(self, other: Position, t: f64) -> Self {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

fn clamp_axis(value: f64, upper: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, upper)
}
