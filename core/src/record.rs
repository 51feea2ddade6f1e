//! Plain data describing combatants and sides outside of the live world.

use crate::{CombatantKind, Health, Position, Speed, Strength, Traits};

/// Presentation color attached to a side. Persisted but never simulated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SideColor {
    /// Red channel in the range `0.0..=1.0`.
    pub red: f64,
    /// Green channel in the range `0.0..=1.0`.
    pub green: f64,
    /// Blue channel in the range `0.0..=1.0`.
    pub blue: f64,
    /// Opacity in the range `0.0..=1.0`.
    pub alpha: f64,
}

impl SideColor {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }
}

/// Stats and variant payload of a combatant, independent of placement.
#[derive(Clone, Debug, PartialEq)]
pub struct CombatantProfile {
    /// Display name; the world derives `<Kind><id>` when absent.
    pub name: Option<String>,
    /// Starting or edited health.
    pub health: Health,
    /// Starting or edited strength.
    pub strength: Strength,
    /// Starting or edited speed.
    pub speed: Speed,
    /// Variant payload.
    pub traits: Traits,
}

impl CombatantProfile {
    /// Kind described by the payload.
    #[must_use]
    pub const fn kind(&self) -> CombatantKind {
        self.traits.kind()
    }
}

/// A combatant that has not yet been registered with a side.
#[derive(Clone, Debug, PartialEq)]
pub struct Recruit {
    /// Stats and payload.
    pub profile: CombatantProfile,
    /// Initial placement on the battlefield.
    pub position: Position,
}

/// Persistable description of one side and its roster in insertion order.
#[derive(Clone, Debug, PartialEq)]
pub struct SideRecord {
    /// Display name of the side.
    pub name: String,
    /// Presentation color.
    pub color: SideColor,
    /// Live combatants in insertion order.
    pub recruits: Vec<Recruit>,
}

/// Persistable description of a whole battle: both sides in world order.
#[derive(Clone, Debug, PartialEq)]
pub struct BattleRecord {
    /// The two opposing sides.
    pub sides: [SideRecord; 2],
}
