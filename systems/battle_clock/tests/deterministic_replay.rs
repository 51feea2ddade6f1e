use std::time::Duration;

use skirmish_core::{
    BattleRecord, BattleState, CombatantKind, Command, Event, KindSelection, SideId,
};
use skirmish_system_battle_clock::{BattleClock, Config};
use skirmish_system_recruitment::{CombatantFactory, FactoryConfig, Muster};
use skirmish_world::{self as world, query, World};

const TICK: Duration = Duration::from_millis(50);
const TIME_LIMIT: Duration = Duration::from_secs(120);

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    events: Vec<Event>,
    record: BattleRecord,
    state: BattleState,
}

#[test]
fn deterministic_replay_produces_identical_battles() {
    let first = replay(0x5151_7a7a);
    let second = replay(0x5151_7a7a);

    assert_eq!(first, second, "replay diverged between runs");
}

#[test]
fn battle_declares_at_most_one_winner() {
    let outcome = replay(0x0dd5_eed5);

    let conclusions: Vec<SideId> = outcome
        .events
        .iter()
        .filter_map(|event| match event {
            Event::BattleConcluded { winner } => Some(*winner),
            _ => None,
        })
        .collect();
    assert!(conclusions.len() <= 1, "winner declared twice: {conclusions:?}");

    if let BattleState::Concluded { winner } = outcome.state {
        assert_eq!(conclusions, vec![winner]);
        let loser = usize::from(winner == SideId::new(0));
        assert!(outcome.record.sides[loser].recruits.is_empty());
        assert!(!outcome.record.sides[1 - loser].recruits.is_empty());
    }
}

#[test]
fn opponents_close_in_and_fight() {
    let outcome = replay(0x00c0_ffee);

    assert!(outcome
        .events
        .iter()
        .any(|event| matches!(event, Event::CombatResolved { .. })));
}

#[test]
fn fallen_combatants_never_act_again() {
    let outcome = replay(0x7777_0001);

    let mut fallen = Vec::new();
    for event in &outcome.events {
        match event {
            Event::CombatantDied { combatant, .. } => fallen.push(*combatant),
            Event::MovementStarted { combatant, .. } | Event::CombatantReady { combatant } => {
                assert!(!fallen.contains(combatant), "{combatant:?} acted after falling");
            }
            Event::CombatResolved {
                attacker, defender, ..
            } => {
                assert!(!fallen.contains(attacker));
                assert!(!fallen.contains(defender));
            }
            _ => {}
        }
    }
}

fn replay(seed: u64) -> ReplayOutcome {
    let mut world = World::default();
    let mut clock = BattleClock::new(Config::new(4.0, 15.0, seed));
    let mut muster = Muster::new(
        CombatantFactory::new(FactoryConfig {
            rng_seed: seed,
            ..FactoryConfig::default()
        })
        .expect("default config is valid"),
    );
    let mut log = Vec::new();

    let light = SideId::new(0);
    let dark = SideId::new(1);
    let mut commands = Vec::new();
    muster.populate(light, KindSelection::Kind(CombatantKind::Hobbit), 2, &mut commands);
    muster.populate(light, KindSelection::Kind(CombatantKind::Wizard), 8, &mut commands);
    muster.populate(dark, KindSelection::Kind(CombatantKind::Nazgul), 4, &mut commands);
    muster.populate(dark, KindSelection::Kind(CombatantKind::Orc), 4, &mut commands);
    commands.push(Command::Run);

    for command in commands {
        execute(&mut world, &mut clock, command, &mut log);
    }

    while query::elapsed(&world) < TIME_LIMIT
        && query::battle_state(&world) == BattleState::Running
    {
        execute(&mut world, &mut clock, Command::Tick { dt: TICK }, &mut log);
    }

    ReplayOutcome {
        events: log,
        record: query::battle_record(&world),
        state: query::battle_state(&world),
    }
}

fn execute(world: &mut World, clock: &mut BattleClock, command: Command, log: &mut Vec<Event>) {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);

    while !events.is_empty() {
        log.extend(events.iter().cloned());
        let view = query::battle_view(world);
        let mut commands = Vec::new();
        clock.handle(&events, &view, &mut commands);

        events.clear();
        for command in commands {
            world::apply(world, command, &mut events);
        }
    }
}
