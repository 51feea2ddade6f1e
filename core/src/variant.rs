//! Closed set of combatant kinds and the rules attached to each of them.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Stealth, Strength};

/// Strength granted to an orc carrying an axe.
pub const AXE_STRENGTH_BONUS: f64 = 5.0;
/// Speed granted to an orc in a fury.
pub const FURY_SPEED_BONUS: f64 = 10.0;
/// Strength granted to a nazgul wearing a ring of power.
pub const RING_STRENGTH_BONUS: f64 = 5.0;
/// Speed granted to a nazgul riding hell hawks.
pub const HELL_HAWKS_SPEED_BONUS: f64 = 10.0;

/// Stealth at or above this value hides a combatant from targeting.
// Equals (stealth floor + strength ceiling) / 2, not the stealth midpoint.
pub const STEALTH_VISIBILITY_THRESHOLD: f64 = 50.0;

/// Kinds of combatant that can take the field.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CombatantKind {
    /// Stealthy halfling.
    Hobbit,
    /// Stealthy spell caster.
    Wizard,
    /// Brute that may carry an axe and fly into a fury.
    Orc,
    /// Wraith that may wear a ring of power and ride hell hawks.
    Nazgul,
}

impl CombatantKind {
    /// Every concrete kind in tag order.
    pub const ALL: [Self; 4] = [Self::Hobbit, Self::Wizard, Self::Orc, Self::Nazgul];

    /// Stable tag used by the persisted battle layout.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Hobbit => 0,
            Self::Wizard => 1,
            Self::Orc => 2,
            Self::Nazgul => 3,
        }
    }

    /// Resolves a persisted tag back into a kind.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Hobbit),
            1 => Some(Self::Wizard),
            2 => Some(Self::Orc),
            3 => Some(Self::Nazgul),
            _ => None,
        }
    }

    /// Human readable name used for default combatant names.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hobbit => "Hobbit",
            Self::Wizard => "Wizard",
            Self::Orc => "Orc",
            Self::Nazgul => "Nazgul",
        }
    }

    /// Family the kind belongs to.
    #[must_use]
    pub const fn family(self) -> Family {
        match self {
            Self::Hobbit | Self::Wizard => Family::Stealth,
            Self::Orc | Self::Nazgul => Family::Warband,
        }
    }

    /// Presentation descriptor for an avatar of the given strength.
    #[must_use]
    pub fn avatar(self, strength: Strength) -> AvatarDescriptor {
        let family = self.family();
        let strength = strength.get();
        let ratio = family
            .avatar_tiers()
            .iter()
            .find(|(threshold, _)| strength >= *threshold)
            .map_or(family.avatar_tiers()[2].1, |(_, ratio)| *ratio);

        AvatarDescriptor {
            shape: family.avatar_shape(),
            size: 20.0 * strength / ratio,
            color: self.avatar_color(),
        }
    }

    const fn avatar_color(self) -> AvatarColor {
        match self {
            Self::Hobbit => AvatarColor::from_rgb(0xff, 0x00, 0x00),
            Self::Wizard => AvatarColor::from_rgb(0x80, 0x00, 0x80),
            Self::Orc => AvatarColor::from_rgb(0x00, 0x00, 0xff),
            Self::Nazgul => AvatarColor::from_rgb(0x00, 0x80, 0x00),
        }
    }
}

impl fmt::Display for CombatantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CombatantKind {
    type Err = UnknownKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownKind(value.to_owned()))
    }
}

/// Error returned when a kind name cannot be resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown combatant kind '{}'", self.0)
    }
}

impl std::error::Error for UnknownKind {}

/// Requested kind when creating a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum KindSelection {
    /// Create exactly this kind.
    Kind(CombatantKind),
    /// Pick one of the concrete kinds uniformly at random.
    Random,
}

impl FromStr for KindSelection {
    type Err = UnknownKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("random") {
            return Ok(Self::Random);
        }
        value.parse().map(Self::Kind)
    }
}

impl TryFrom<String> for KindSelection {
    type Error = UnknownKind;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KindSelection> for String {
    fn from(value: KindSelection) -> Self {
        match value {
            KindSelection::Kind(kind) => kind.label().to_lowercase(),
            KindSelection::Random => "random".to_owned(),
        }
    }
}

/// Grouping of kinds that share placement and avatar rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    /// Kinds that rely on stealth.
    Stealth,
    /// Kinds that rely on gear and mounts.
    Warband,
}

impl Family {
    /// Strength thresholds paired with the avatar size ratio, strongest first.
    #[must_use]
    pub const fn avatar_tiers(self) -> [(f64, f64); 3] {
        match self {
            Self::Stealth => [(85.0, 145.0), (50.0, 130.0), (0.0, 80.0)],
            Self::Warband => [(85.0, 100.0), (50.0, 100.0), (0.0, 65.0)],
        }
    }

    const fn avatar_shape(self) -> AvatarShape {
        match self {
            Self::Stealth => AvatarShape::Circle,
            Self::Warband => AvatarShape::Square,
        }
    }
}

/// Variant payload carried by a combatant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Traits {
    /// Hobbit payload.
    Hobbit {
        /// Concealment rating.
        stealth: Stealth,
    },
    /// Wizard payload.
    Wizard {
        /// Concealment rating.
        stealth: Stealth,
    },
    /// Orc payload.
    Orc {
        /// Whether the orc carries an axe.
        has_axe: bool,
        /// Whether the orc is in a fury.
        has_fury: bool,
    },
    /// Nazgul payload.
    Nazgul {
        /// Whether the nazgul wears a ring of power.
        has_ring_of_power: bool,
        /// Whether the nazgul rides hell hawks.
        has_hell_hawks: bool,
    },
}

impl Traits {
    /// Kind described by the payload.
    #[must_use]
    pub const fn kind(&self) -> CombatantKind {
        match self {
            Self::Hobbit { .. } => CombatantKind::Hobbit,
            Self::Wizard { .. } => CombatantKind::Wizard,
            Self::Orc { .. } => CombatantKind::Orc,
            Self::Nazgul { .. } => CombatantKind::Nazgul,
        }
    }

    /// Stealth rating for stealth-bearing kinds.
    #[must_use]
    pub const fn stealth(&self) -> Option<Stealth> {
        match self {
            Self::Hobbit { stealth } | Self::Wizard { stealth } => Some(*stealth),
            Self::Orc { .. } | Self::Nazgul { .. } => None,
        }
    }

    /// Stat bonus applied once when a combatant is created.
    #[must_use]
    pub fn stat_bonus(&self) -> StatBonus {
        match *self {
            Self::Hobbit { .. } | Self::Wizard { .. } => StatBonus::default(),
            Self::Orc { has_axe, has_fury } => StatBonus {
                strength: if has_axe { AXE_STRENGTH_BONUS } else { 0.0 },
                speed: if has_fury { FURY_SPEED_BONUS } else { 0.0 },
            },
            Self::Nazgul {
                has_ring_of_power,
                has_hell_hawks,
            } => StatBonus {
                strength: if has_ring_of_power {
                    RING_STRENGTH_BONUS
                } else {
                    0.0
                },
                speed: if has_hell_hawks {
                    HELL_HAWKS_SPEED_BONUS
                } else {
                    0.0
                },
            },
        }
    }

    /// Reports whether opponents may target a combatant carrying this payload.
    ///
    /// Evaluated on every query: edits to stealth or hell hawks take effect
    /// immediately.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        match *self {
            Self::Hobbit { stealth } | Self::Wizard { stealth } => {
                stealth.get() < STEALTH_VISIBILITY_THRESHOLD
            }
            Self::Orc { .. } => true,
            Self::Nazgul { has_hell_hawks, .. } => !has_hell_hawks,
        }
    }
}

/// Additive stat modifiers granted by a variant payload.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StatBonus {
    /// Strength added to the sampled base value.
    pub strength: f64,
    /// Speed added to the sampled base value.
    pub speed: f64,
}

/// Outline drawn for a combatant's avatar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AvatarShape {
    /// Round avatar.
    Circle,
    /// Square avatar.
    Square,
}

/// Byte RGB color of an avatar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AvatarColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl AvatarColor {
    /// Creates a new avatar color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Presentation-only description of a combatant's avatar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AvatarDescriptor {
    /// Outline of the avatar.
    pub shape: AvatarShape,
    /// Edge length or diameter in world units.
    pub size: f64,
    /// Fill color.
    pub color: AvatarColor,
}
