//! Read-only snapshots handed to systems and adapters.

use crate::{
    AvatarDescriptor, BattleState, CombatantId, CombatantKind, Health, Position, SideColor, SideId,
    Speed, Strength, Traits,
};

/// Scheduling phase of a live combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CombatantPhase {
    /// Waiting for its next tick.
    Idle,
    /// Travelling toward a waypoint.
    Moving,
    /// Recovering after a combat round.
    Fighting,
}

/// Immutable representation of a single combatant used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct CombatantSnapshot {
    /// Identifier assigned by the world.
    pub id: CombatantId,
    /// Side the combatant fights for.
    pub side: SideId,
    /// Display name.
    pub name: String,
    /// Remaining health.
    pub health: Health,
    /// Striking power.
    pub strength: Strength,
    /// Movement rate.
    pub speed: Speed,
    /// Current position, interpolated while moving.
    pub position: Position,
    /// Variant payload.
    pub traits: Traits,
    /// Scheduling phase.
    pub phase: CombatantPhase,
}

impl CombatantSnapshot {
    /// Kind of the combatant.
    #[must_use]
    pub const fn kind(&self) -> CombatantKind {
        self.traits.kind()
    }

    /// Reports whether opponents may target the combatant.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.traits.is_visible()
    }

    /// Reports whether the combatant still has health left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.health.is_depleted()
    }

    /// Presentation descriptor derived from kind and strength.
    #[must_use]
    pub fn avatar(&self) -> AvatarDescriptor {
        self.kind().avatar(self.strength)
    }
}

/// Read-only roster of a side in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CombatantView {
    snapshots: Vec<CombatantSnapshot>,
}

impl CombatantView {
    /// Creates a view that preserves the order of the provided snapshots.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<CombatantSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the snapshots in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CombatantSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a combatant by identifier.
    #[must_use]
    pub fn get(&self, id: CombatantId) -> Option<&CombatantSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == id)
    }

    /// Number of combatants in the roster.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable representation of a side used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct SideView {
    /// Identifier of the side.
    pub id: SideId,
    /// Display name.
    pub name: String,
    /// Presentation color.
    pub color: SideColor,
    /// Identifier of the side it fights against.
    pub opposing: SideId,
    /// Whether the side's combatants are paused.
    pub suspended: bool,
    /// Live combatants in insertion order.
    pub roster: CombatantView,
}

/// Read-only snapshot of the whole battle.
#[derive(Clone, Debug, PartialEq)]
pub struct BattleView {
    state: BattleState,
    sides: Vec<SideView>,
}

impl BattleView {
    /// Creates a new battle view.
    #[must_use]
    pub fn new(state: BattleState, sides: Vec<SideView>) -> Self {
        Self { state, sides }
    }

    /// Lifecycle state at the time of the snapshot.
    #[must_use]
    pub const fn state(&self) -> BattleState {
        self.state
    }

    /// Iterator over the sides in world order.
    pub fn sides(&self) -> impl Iterator<Item = &SideView> {
        self.sides.iter()
    }

    /// Looks up a side by identifier.
    #[must_use]
    pub fn side(&self, id: SideId) -> Option<&SideView> {
        self.sides.iter().find(|side| side.id == id)
    }

    /// Side opposing the provided one.
    #[must_use]
    pub fn opponents_of(&self, id: SideId) -> Option<&SideView> {
        let opposing = self.side(id)?.opposing;
        self.side(opposing)
    }

    /// Looks up a combatant on either side.
    #[must_use]
    pub fn combatant(&self, id: CombatantId) -> Option<&CombatantSnapshot> {
        self.sides.iter().find_map(|side| side.roster.get(id))
    }
}
