#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battle state for the skirmish engine.

mod combat;

use std::{collections::BTreeMap, time::Duration};

use skirmish_core::{
    BattleRecord, BattleState, CombatRoll, CombatantId, CombatantKind, CombatantPhase,
    CombatantProfile, Command, EnlistError, Event, Health, Position, Recruit, SideColor, SideId,
    Speed, Strength, Traits,
};
use tracing::{debug, info, warn};

use crate::combat::{exchange_blows, Duelist};

/// Time a combatant spends recovering after a combat round before its next tick.
pub const FIGHT_RECOVERY: Duration = Duration::from_millis(500);

const SIDE_IDS: [SideId; 2] = [SideId::new(0), SideId::new(1)];

/// Name and color assigned to a side when the world is created.
#[derive(Clone, Debug, PartialEq)]
pub struct SideConfig {
    /// Display name of the side.
    pub name: String,
    /// Presentation color of the side.
    pub color: SideColor,
}

impl SideConfig {
    /// Creates a new side configuration.
    #[must_use]
    pub fn new(name: impl Into<String>, color: SideColor) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

/// Represents the authoritative battle: two mutually opposed sides and every
/// live combatant keyed by handle.
#[derive(Debug)]
pub struct World {
    state: BattleState,
    sides: [Side; 2],
    combatants: BTreeMap<CombatantId, Combatant>,
    next_combatant: u32,
    elapsed: Duration,
}

impl World {
    /// Creates an empty battle with the provided sides opposing each other.
    #[must_use]
    pub fn new(sides: [SideConfig; 2]) -> Self {
        let [first, second] = sides;
        Self {
            state: BattleState::Populating,
            sides: [
                Side::new(SIDE_IDS[0], first, SIDE_IDS[1]),
                Side::new(SIDE_IDS[1], second, SIDE_IDS[0]),
            ],
            combatants: BTreeMap::new(),
            next_combatant: 0,
            elapsed: Duration::ZERO,
        }
    }

    fn side(&self, id: SideId) -> Option<&Side> {
        self.sides.iter().find(|side| side.id == id)
    }

    fn side_mut(&mut self, id: SideId) -> Option<&mut Side> {
        self.sides.iter_mut().find(|side| side.id == id)
    }

    fn allocate_id(&mut self) -> CombatantId {
        let id = CombatantId::new(self.next_combatant);
        self.next_combatant = self.next_combatant.saturating_add(1);
        id
    }

    fn set_state(&mut self, state: BattleState, out_events: &mut Vec<Event>) {
        if self.state == state {
            return;
        }
        self.state = state;
        out_events.push(Event::BattleStateChanged { state });
    }

    fn register(&mut self, side: SideId, recruit: Recruit) -> Option<Combatant> {
        let id = self.allocate_id();
        let combatant = Combatant::from_recruit(id, side, recruit);
        self.side_mut(side)?.roster.push(id);
        let _ = self.combatants.insert(id, combatant.clone());
        Some(combatant)
    }

    fn enlist(&mut self, side: SideId, recruit: Recruit, out_events: &mut Vec<Event>) {
        if self.state.is_concluded() {
            warn!(side = side.get(), "enlist rejected: battle already concluded");
            out_events.push(Event::EnlistRejected {
                side,
                reason: EnlistError::BattleConcluded,
            });
            return;
        }

        let Some(combatant) = self.register(side, recruit) else {
            warn!(side = side.get(), "enlist rejected: unknown side");
            out_events.push(Event::EnlistRejected {
                side,
                reason: EnlistError::UnknownSide,
            });
            return;
        };

        debug!(combatant = combatant.id.get(), name = %combatant.name, "combatant enlisted");
        out_events.push(Event::CombatantEnlisted {
            combatant: combatant.id,
            side,
            kind: combatant.kind(),
            position: combatant.position,
        });
    }

    fn ready_idle(&self, side: SideId, out_events: &mut Vec<Event>) {
        let Some(side) = self.side(side) else {
            return;
        };
        if side.suspended {
            return;
        }
        for id in &side.roster {
            let idle = self
                .combatants
                .get(id)
                .is_some_and(|combatant| combatant.motion == Motion::Idle);
            if idle {
                out_events.push(Event::CombatantReady { combatant: *id });
            }
        }
    }

    fn run(&mut self, out_events: &mut Vec<Event>) {
        if self.state.is_concluded() {
            warn!("run ignored: battle already concluded");
            return;
        }
        self.set_state(BattleState::Running, out_events);
        info!(combatants = self.combatants.len(), "battle running");
        for side in SIDE_IDS {
            self.ready_idle(side, out_events);
        }
    }

    fn suspend(&mut self, out_events: &mut Vec<Event>) {
        if self.state != BattleState::Running {
            return;
        }
        self.set_state(BattleState::Suspended, out_events);
        info!("battle suspended");
    }

    fn set_side_suspended(&mut self, id: SideId, suspended: bool, out_events: &mut Vec<Event>) {
        let Some(side) = self.side_mut(id) else {
            warn!(side = id.get(), "suspension toggle ignored: unknown side");
            return;
        };
        if side.suspended == suspended {
            return;
        }
        side.suspended = suspended;

        if suspended {
            info!(side = id.get(), "side suspended");
            out_events.push(Event::SideSuspended { side: id });
        } else {
            info!(side = id.get(), "side resumed");
            out_events.push(Event::SideResumed { side: id });
            if self.state == BattleState::Running {
                self.ready_idle(id, out_events);
            }
        }
    }

    fn clear_side(&mut self, id: SideId, out_events: &mut Vec<Event>) {
        let Some(side) = self.side_mut(id) else {
            warn!(side = id.get(), "clear ignored: unknown side");
            return;
        };
        let roster = std::mem::take(&mut side.roster);
        for combatant in roster {
            let _ = self.combatants.remove(&combatant);
        }
        info!(side = id.get(), "side cleared");
        out_events.push(Event::SideCleared { side: id });
    }

    fn clear(&mut self, out_events: &mut Vec<Event>) {
        for side in SIDE_IDS {
            self.clear_side(side, out_events);
        }
        self.set_state(BattleState::Populating, out_events);
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.state != BattleState::Running {
            return;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });

        let scheduled: Vec<CombatantId> = self
            .sides
            .iter()
            .filter(|side| !side.suspended)
            .flat_map(|side| side.roster.iter().copied())
            .collect();

        for id in scheduled {
            if let Some(combatant) = self.combatants.get_mut(&id) {
                combatant.advance(dt, out_events);
            }
        }
    }

    fn move_combatant(
        &mut self,
        id: CombatantId,
        waypoint: Position,
        duration: Duration,
        out_events: &mut Vec<Event>,
    ) {
        if self.state != BattleState::Running {
            debug!(combatant = id.get(), "move ignored: battle not running");
            return;
        }
        let Some(combatant) = self.combatants.get_mut(&id) else {
            debug!(combatant = id.get(), "move ignored: combatant gone");
            return;
        };
        if !combatant.is_alive() {
            return;
        }

        let from = combatant.position;
        let to = waypoint.clamp_to_battlefield();
        combatant.motion = Motion::Moving {
            from,
            to,
            elapsed: Duration::ZERO,
            duration,
        };
        out_events.push(Event::MovementStarted {
            combatant: id,
            from,
            to,
            duration,
        });
    }

    fn complete_movement(&mut self, id: CombatantId, out_events: &mut Vec<Event>) {
        if self.state != BattleState::Running {
            debug!(combatant = id.get(), "completion ignored: battle not running");
            return;
        }
        let Some(side) = self.combatants.get(&id).map(|combatant| combatant.side) else {
            return;
        };
        if self.side(side).map_or(true, |side| side.suspended) {
            debug!(combatant = id.get(), "completion ignored: side suspended");
            return;
        }
        let Some(combatant) = self.combatants.get_mut(&id) else {
            return;
        };
        let Motion::Moving { to, .. } = combatant.motion else {
            return;
        };
        combatant.position = to;
        combatant.motion = Motion::Idle;
        out_events.push(Event::MovementCompleted {
            combatant: id,
            position: to,
        });
        out_events.push(Event::CombatantReady { combatant: id });
    }

    fn engage(
        &mut self,
        attacker: CombatantId,
        defender: CombatantId,
        rolls: (CombatRoll, CombatRoll),
        out_events: &mut Vec<Event>,
    ) {
        if self.state != BattleState::Running {
            debug!(attacker = attacker.get(), "engage ignored: battle not running");
            return;
        }
        let Some(first) = self.combatants.get(&attacker) else {
            return;
        };
        if !first.is_alive() {
            return;
        }
        let second = self
            .combatants
            .get(&defender)
            .filter(|second| second.is_alive() && second.side != first.side);
        let Some(second) = second else {
            // The target fell earlier in the same batch; let the attacker pick again.
            debug!(
                attacker = attacker.get(),
                defender = defender.get(),
                "engage ignored: target gone"
            );
            out_events.push(Event::CombatantReady {
                combatant: attacker,
            });
            return;
        };

        let outcome = exchange_blows(first.duelist(), second.duelist(), rolls.0, rolls.1);

        if let Some(combatant) = self.combatants.get_mut(&attacker) {
            combatant.health = outcome.attacker;
            combatant.motion = Motion::Fighting {
                elapsed: Duration::ZERO,
                duration: FIGHT_RECOVERY,
            };
        }
        if let Some(combatant) = self.combatants.get_mut(&defender) {
            combatant.health = outcome.defender;
        }

        debug!(
            attacker = attacker.get(),
            defender = defender.get(),
            attacker_health = outcome.attacker.get(),
            defender_health = outcome.defender.get(),
            "combat round resolved"
        );
        out_events.push(Event::CombatResolved {
            attacker,
            defender,
            attacker_health: outcome.attacker,
            defender_health: outcome.defender,
        });

        if outcome.defender.is_depleted() {
            self.remove_fallen(defender, out_events);
        }
        if outcome.attacker.is_depleted() {
            self.remove_fallen(attacker, out_events);
        }
    }

    fn remove_combatant(&mut self, id: CombatantId, out_events: &mut Vec<Event>) {
        match self.combatants.get(&id) {
            Some(combatant) if !combatant.is_alive() => self.remove_fallen(id, out_events),
            Some(_) => warn!(combatant = id.get(), "removal ignored: combatant still alive"),
            None => {}
        }
    }

    fn remove_fallen(&mut self, id: CombatantId, out_events: &mut Vec<Event>) {
        let Some(combatant) = self.combatants.remove(&id) else {
            return;
        };
        let Some(side) = self.side_mut(combatant.side) else {
            return;
        };
        if let Some(index) = side.roster.iter().position(|member| *member == id) {
            let _ = side.roster.remove(index);
        }
        let emptied = side.roster.is_empty();
        let opposing = side.opposing;

        debug!(combatant = id.get(), name = %combatant.name, "combatant fell");
        out_events.push(Event::CombatantDied {
            combatant: id,
            side: combatant.side,
        });

        if emptied {
            self.declare_winner(opposing, out_events);
        }
    }

    fn declare_winner(&mut self, winner: SideId, out_events: &mut Vec<Event>) {
        if self.state.is_concluded() {
            return;
        }
        let standing = self
            .side(winner)
            .is_some_and(|side| !side.roster.is_empty());
        if !standing {
            return;
        }

        self.set_state(BattleState::Concluded { winner }, out_events);
        out_events.push(Event::BattleConcluded { winner });
        if let Some(side) = self.side(winner) {
            info!(winner = %side.name, "battle concluded");
        }
    }

    fn edit_combatant(
        &mut self,
        id: CombatantId,
        profile: CombatantProfile,
        out_events: &mut Vec<Event>,
    ) {
        let Some(combatant) = self.combatants.get_mut(&id) else {
            warn!(combatant = id.get(), "edit ignored: combatant gone");
            return;
        };
        if combatant.kind() != profile.kind() {
            warn!(combatant = id.get(), "edit ignored: kind cannot change");
            return;
        }

        if let Some(name) = profile.name {
            combatant.name = name;
        }
        combatant.health = profile.health;
        combatant.strength = profile.strength;
        combatant.speed = profile.speed;
        combatant.traits = profile.traits;
        out_events.push(Event::CombatantEdited { combatant: id });
    }

    fn restore(&mut self, record: BattleRecord, out_events: &mut Vec<Event>) {
        self.combatants.clear();
        let mut restored = Vec::new();
        for (index, side_record) in record.sides.into_iter().enumerate() {
            let side_id = SIDE_IDS[index];
            if let Some(side) = self.side_mut(side_id) {
                side.name = side_record.name;
                side.color = side_record.color;
                side.suspended = false;
                side.roster.clear();
            }
            for recruit in side_record.recruits {
                if let Some(combatant) = self.register(side_id, recruit) {
                    restored.push(Event::CombatantRestored {
                        combatant: combatant.id,
                        side: side_id,
                        kind: combatant.kind(),
                        position: combatant.position,
                    });
                }
            }
        }

        info!(combatants = restored.len(), "battle restored");
        out_events.push(Event::BattleRestored);
        self.set_state(BattleState::Populating, out_events);
        out_events.extend(restored);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new([
            SideConfig::new("Light", SideColor::new(0.0, 1.0, 1.0, 1.0)),
            SideConfig::new("Dark", SideColor::new(1.0, 0.0, 0.0, 1.0)),
        ])
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Enlist { side, recruit } => world.enlist(side, recruit, out_events),
        Command::Run => world.run(out_events),
        Command::Suspend => world.suspend(out_events),
        Command::SuspendSide { side } => world.set_side_suspended(side, true, out_events),
        Command::ResumeSide { side } => world.set_side_suspended(side, false, out_events),
        Command::Clear => world.clear(out_events),
        Command::ClearSide { side } => world.clear_side(side, out_events),
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::MoveCombatant {
            combatant,
            waypoint,
            duration,
        } => world.move_combatant(combatant, waypoint, duration, out_events),
        Command::CompleteMovement { combatant } => world.complete_movement(combatant, out_events),
        Command::Engage {
            attacker,
            defender,
            attacker_roll,
            defender_roll,
        } => world.engage(
            attacker,
            defender,
            (attacker_roll, defender_roll),
            out_events,
        ),
        Command::RemoveCombatant { combatant } => world.remove_combatant(combatant, out_events),
        Command::EditCombatant { combatant, profile } => {
            world.edit_combatant(combatant, profile, out_events)
        }
        Command::RestoreBattle { record } => world.restore(record, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{Side, World};
    use skirmish_core::{
        BattleRecord, BattleState, BattleView, CombatantId, CombatantSnapshot, CombatantView,
        SideId, SideRecord, SideView,
    };

    /// Current lifecycle state of the battle.
    #[must_use]
    pub fn battle_state(world: &World) -> BattleState {
        world.state
    }

    /// Identifiers of both sides in world order.
    #[must_use]
    pub fn side_ids(world: &World) -> [SideId; 2] {
        let [first, second] = &world.sides;
        [first.id, second.id]
    }

    /// Side fighting against the provided one.
    #[must_use]
    pub fn opposing_side(world: &World, side: SideId) -> Option<SideId> {
        world.side(side).map(|side| side.opposing)
    }

    /// Total simulated time the battle has been running.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Captures a read-only view of a side's live combatants in insertion order.
    #[must_use]
    pub fn roster(world: &World, side: SideId) -> CombatantView {
        world
            .side(side)
            .map(|side| roster_of(world, side))
            .unwrap_or_default()
    }

    /// Captures a read-only view of one side.
    #[must_use]
    pub fn side(world: &World, side: SideId) -> Option<SideView> {
        world.side(side).map(|side| side_view(world, side))
    }

    /// Captures a snapshot of a single live combatant.
    #[must_use]
    pub fn combatant(world: &World, id: CombatantId) -> Option<CombatantSnapshot> {
        world.combatants.get(&id).map(super::Combatant::snapshot)
    }

    /// Captures a read-only view of the whole battle.
    #[must_use]
    pub fn battle_view(world: &World) -> BattleView {
        BattleView::new(
            world.state,
            world
                .sides
                .iter()
                .map(|side| side_view(world, side))
                .collect(),
        )
    }

    /// Describes both sides in a form suitable for persistence.
    #[must_use]
    pub fn battle_record(world: &World) -> BattleRecord {
        let [first, second] = &world.sides;
        BattleRecord {
            sides: [side_record(world, first), side_record(world, second)],
        }
    }

    fn roster_of(world: &World, side: &Side) -> CombatantView {
        CombatantView::from_snapshots(
            side.roster
                .iter()
                .filter_map(|id| world.combatants.get(id))
                .map(super::Combatant::snapshot)
                .collect(),
        )
    }

    fn side_view(world: &World, side: &Side) -> SideView {
        SideView {
            id: side.id,
            name: side.name.clone(),
            color: side.color,
            opposing: side.opposing,
            suspended: side.suspended,
            roster: roster_of(world, side),
        }
    }

    fn side_record(world: &World, side: &Side) -> SideRecord {
        SideRecord {
            name: side.name.clone(),
            color: side.color,
            recruits: side
                .roster
                .iter()
                .filter_map(|id| world.combatants.get(id))
                .map(super::Combatant::recruit)
                .collect(),
        }
    }
}

#[derive(Clone, Debug)]
struct Side {
    id: SideId,
    name: String,
    color: SideColor,
    opposing: SideId,
    suspended: bool,
    roster: Vec<CombatantId>,
}

impl Side {
    fn new(id: SideId, config: SideConfig, opposing: SideId) -> Self {
        Self {
            id,
            name: config.name,
            color: config.color,
            opposing,
            suspended: false,
            roster: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Motion {
    Idle,
    Moving {
        from: Position,
        to: Position,
        elapsed: Duration,
        duration: Duration,
    },
    Fighting {
        elapsed: Duration,
        duration: Duration,
    },
}

impl Motion {
    fn phase(&self) -> CombatantPhase {
        match self {
            Self::Idle => CombatantPhase::Idle,
            Self::Moving { .. } => CombatantPhase::Moving,
            Self::Fighting { .. } => CombatantPhase::Fighting,
        }
    }
}

#[derive(Clone, Debug)]
struct Combatant {
    id: CombatantId,
    side: SideId,
    name: String,
    health: Health,
    strength: Strength,
    speed: Speed,
    position: Position,
    traits: Traits,
    motion: Motion,
}

impl Combatant {
    fn from_recruit(id: CombatantId, side: SideId, recruit: Recruit) -> Self {
        let Recruit { profile, position } = recruit;
        let kind = profile.kind();
        let name = profile
            .name
            .unwrap_or_else(|| default_name(kind, id));
        Self {
            id,
            side,
            name,
            health: profile.health,
            strength: profile.strength,
            speed: profile.speed,
            position: position.clamp_to_battlefield(),
            traits: profile.traits,
            motion: Motion::Idle,
        }
    }

    fn kind(&self) -> CombatantKind {
        self.traits.kind()
    }

    fn is_alive(&self) -> bool {
        !self.health.is_depleted()
    }

    fn duelist(&self) -> Duelist {
        Duelist {
            health: self.health,
            strength: self.strength,
        }
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        match self.motion {
            Motion::Idle => {}
            Motion::Moving {
                from,
                to,
                elapsed,
                duration,
            } => {
                let elapsed = elapsed.saturating_add(dt);
                if elapsed >= duration {
                    self.position = to;
                    self.motion = Motion::Idle;
                    out_events.push(Event::MovementCompleted {
                        combatant: self.id,
                        position: to,
                    });
                    out_events.push(Event::CombatantReady { combatant: self.id });
                } else {
                    let progress = elapsed.as_secs_f64() / duration.as_secs_f64();
                    self.position = from.lerp(to, progress);
                    self.motion = Motion::Moving {
                        from,
                        to,
                        elapsed,
                        duration,
                    };
                }
            }
            Motion::Fighting { elapsed, duration } => {
                let elapsed = elapsed.saturating_add(dt);
                if elapsed >= duration {
                    self.motion = Motion::Idle;
                    out_events.push(Event::CombatantReady { combatant: self.id });
                } else {
                    self.motion = Motion::Fighting { elapsed, duration };
                }
            }
        }
    }

    fn snapshot(&self) -> skirmish_core::CombatantSnapshot {
        skirmish_core::CombatantSnapshot {
            id: self.id,
            side: self.side,
            name: self.name.clone(),
            health: self.health,
            strength: self.strength,
            speed: self.speed,
            position: self.position,
            traits: self.traits,
            phase: self.motion.phase(),
        }
    }

    fn recruit(&self) -> Recruit {
        Recruit {
            profile: CombatantProfile {
                name: Some(self.name.clone()),
                health: self.health,
                strength: self.strength,
                speed: self.speed,
                traits: self.traits,
            },
            position: self.position,
        }
    }
}

fn default_name(kind: CombatantKind, id: CombatantId) -> String {
    format!("{}{}", kind.label(), id.get())
}
