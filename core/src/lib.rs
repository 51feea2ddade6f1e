#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the skirmish engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative battle world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! that systems react to deterministically. Systems read immutable snapshots
//! such as [`BattleView`] and respond exclusively with new command batches.

mod attributes;
mod geometry;
mod record;
mod variant;
mod view;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use attributes::{
    round_to_tenth, AttributeRange, Health, Speed, Stealth, Strength, HEALTH_RANGE, SPEED_RANGE,
    STEALTH_RANGE, STRENGTH_RANGE,
};
pub use geometry::{Position, BATTLEFIELD_HEIGHT, BATTLEFIELD_WIDTH};
pub use record::{BattleRecord, CombatantProfile, Recruit, SideColor, SideRecord};
pub use variant::{
    AvatarColor, AvatarDescriptor, AvatarShape, CombatantKind, Family, KindSelection, StatBonus,
    Traits, UnknownKind, AXE_STRENGTH_BONUS, FURY_SPEED_BONUS, HELL_HAWKS_SPEED_BONUS,
    RING_STRENGTH_BONUS, STEALTH_VISIBILITY_THRESHOLD,
};
pub use view::{BattleView, CombatantPhase, CombatantSnapshot, CombatantView, SideView};

/// Fraction of an opponent's strength dealt as damage by a full-strength roll.
pub const DAMAGE_RATIO: f64 = 0.2;

/// Lifecycle state of a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BattleState {
    /// Sides are being filled; nothing advances.
    Populating,
    /// Combatants advance on their own schedules.
    Running,
    /// Pending steps are paused without losing state.
    Suspended,
    /// Terminal: one side was wiped out while the other still stood.
    Concluded {
        /// Side that won the battle.
        winner: SideId,
    },
}

impl BattleState {
    /// Reports whether the battle reached its terminal state.
    #[must_use]
    pub const fn is_concluded(&self) -> bool {
        matches!(self, Self::Concluded { .. })
    }
}

/// Commands that express all permissible battle mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Registers a new combatant with a side.
    Enlist {
        /// Side receiving the combatant.
        side: SideId,
        /// Combatant to register.
        recruit: Recruit,
    },
    /// Begins or resumes ticking every combatant on both sides.
    Run,
    /// Pauses every pending step on both sides.
    Suspend,
    /// Pauses the pending steps of one side.
    SuspendSide {
        /// Side to pause.
        side: SideId,
    },
    /// Resumes the pending steps of one side.
    ResumeSide {
        /// Side to resume.
        side: SideId,
    },
    /// Removes every combatant from both sides without declaring a winner.
    Clear,
    /// Removes every combatant from one side without declaring a winner.
    ClearSide {
        /// Side to empty.
        side: SideId,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Sends a combatant toward a waypoint.
    MoveCombatant {
        /// Combatant to move.
        combatant: CombatantId,
        /// Destination, clamped to the battlefield.
        waypoint: Position,
        /// Time the movement takes.
        duration: Duration,
    },
    /// Reports that an external animator finished moving a combatant.
    ///
    /// Ignored unless the battle is running and the combatant's side is active.
    CompleteMovement {
        /// Combatant whose movement completed.
        combatant: CombatantId,
    },
    /// Resolves one mutual combat round.
    Engage {
        /// Combatant initiating the round.
        attacker: CombatantId,
        /// Combatant being attacked.
        defender: CombatantId,
        /// Roll scaling the damage the attacker receives.
        attacker_roll: CombatRoll,
        /// Roll scaling the damage the defender receives.
        defender_roll: CombatRoll,
    },
    /// Removes a fallen combatant from its side.
    RemoveCombatant {
        /// Combatant to remove.
        combatant: CombatantId,
    },
    /// Overwrites the stats and payload of a combatant.
    EditCombatant {
        /// Combatant to edit.
        combatant: CombatantId,
        /// Replacement stats; values are clamped on write.
        profile: CombatantProfile,
    },
    /// Replaces both sides with a previously saved battle.
    RestoreBattle {
        /// Fully decoded battle.
        record: BattleRecord,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a combatant joined a side.
    CombatantEnlisted {
        /// Identifier assigned to the combatant.
        combatant: CombatantId,
        /// Side the combatant joined.
        side: SideId,
        /// Kind of the combatant.
        kind: CombatantKind,
        /// Initial placement.
        position: Position,
    },
    /// Reports that an enlist request was rejected.
    EnlistRejected {
        /// Side named by the request.
        side: SideId,
        /// Specific reason the request failed.
        reason: EnlistError,
    },
    /// Announces that the battle entered a new lifecycle state.
    BattleStateChanged {
        /// State that became active.
        state: BattleState,
    },
    /// Confirms that a side was paused.
    SideSuspended {
        /// Side that was paused.
        side: SideId,
    },
    /// Confirms that a side was resumed.
    SideResumed {
        /// Side that was resumed.
        side: SideId,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Signals that a combatant is due for its next tick.
    CombatantReady {
        /// Combatant to advance.
        combatant: CombatantId,
    },
    /// Confirms that a combatant started moving.
    MovementStarted {
        /// Combatant that is moving.
        combatant: CombatantId,
        /// Position at the start of the movement.
        from: Position,
        /// Clamped destination.
        to: Position,
        /// Time the movement takes.
        duration: Duration,
    },
    /// Confirms that a combatant reached its waypoint.
    MovementCompleted {
        /// Combatant that arrived.
        combatant: CombatantId,
        /// Position reached.
        position: Position,
    },
    /// Reports the outcome of a combat round.
    CombatResolved {
        /// Combatant that initiated the round.
        attacker: CombatantId,
        /// Combatant that was attacked.
        defender: CombatantId,
        /// Attacker health after the round.
        attacker_health: Health,
        /// Defender health after the round.
        defender_health: Health,
    },
    /// Confirms that a fallen combatant left its side.
    CombatantDied {
        /// Combatant that was removed.
        combatant: CombatantId,
        /// Side it belonged to.
        side: SideId,
    },
    /// Announces the winner. Emitted at most once per battle.
    BattleConcluded {
        /// Side that won.
        winner: SideId,
    },
    /// Confirms that a side was emptied.
    SideCleared {
        /// Side that was emptied.
        side: SideId,
    },
    /// Confirms that a combatant's stats were overwritten.
    CombatantEdited {
        /// Combatant that was edited.
        combatant: CombatantId,
    },
    /// Confirms that a saved battle replaced the live one.
    BattleRestored,
    /// Announces a combatant recreated from a saved battle.
    CombatantRestored {
        /// Identifier assigned to the combatant.
        combatant: CombatantId,
        /// Side the combatant joined.
        side: SideId,
        /// Kind of the combatant.
        kind: CombatantKind,
        /// Restored placement.
        position: Position,
    },
}

/// Reasons an enlist request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnlistError {
    /// No side with the provided identifier exists.
    UnknownSide,
    /// The battle already has a winner; it must be cleared first.
    BattleConcluded,
}

/// Unique identifier assigned to a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CombatantId(u32);

impl CombatantId {
    /// Creates a new combatant identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SideId(u32);

impl SideId {
    /// Creates a new side identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Uniform draw in `[0, 1)` scaling the damage of one combat round.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct CombatRoll(f64);

impl CombatRoll {
    /// Creates a roll, snapping the value into `[0, 1)`.
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value.is_nan() || value < 0.0 {
            return Self(0.0);
        }
        if value >= 1.0 {
            return Self(1.0 - f64::EPSILON);
        }
        Self(value)
    }

    /// Retrieves the rolled value.
    #[must_use]
    pub const fn get(&self) -> f64 {
        self.0
    }

    /// Damage dealt by an opponent of the given strength.
    #[must_use]
    pub fn damage_from(&self, strength: Strength) -> f64 {
        strength.get() * DAMAGE_RATIO * self.0
    }
}

#[cfg(test)]
mod tests {
    use super::{CombatRoll, CombatantId, EnlistError, SideId, Strength};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn combatant_id_round_trips_through_bincode() {
        assert_round_trip(&CombatantId::new(42));
    }

    #[test]
    fn side_id_round_trips_through_bincode() {
        assert_round_trip(&SideId::new(1));
    }

    #[test]
    fn enlist_error_round_trips_through_bincode() {
        assert_round_trip(&EnlistError::BattleConcluded);
    }

    #[test]
    fn combat_roll_stays_below_one() {
        assert!(CombatRoll::new(1.0).get() < 1.0);
        assert_eq!(CombatRoll::new(-0.5).get(), 0.0);
        assert_eq!(CombatRoll::new(f64::NAN).get(), 0.0);
    }

    #[test]
    fn damage_is_bounded_by_a_fifth_of_strength() {
        let strength = Strength::new(60.0);
        assert_eq!(CombatRoll::new(0.0).damage_from(strength), 0.0);
        assert!(CombatRoll::new(0.999_999).damage_from(strength) < 12.0);
    }
}
