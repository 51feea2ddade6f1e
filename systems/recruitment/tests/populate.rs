use skirmish_core::{CombatantKind, Command, Event, KindSelection, SideId};
use skirmish_system_recruitment::{CombatantFactory, FactoryConfig, Muster};
use skirmish_world::{self as world, query, World};

fn muster(seed: u64) -> Muster {
    Muster::new(
        CombatantFactory::new(FactoryConfig {
            rng_seed: seed,
            ..FactoryConfig::default()
        })
        .expect("default config is valid"),
    )
}

fn enlist_all(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

#[test]
fn populated_sides_keep_insertion_order() {
    let mut world = World::default();
    let light = SideId::new(0);
    let mut muster = muster(0x0bad_cafe);

    let mut commands = Vec::new();
    muster.populate(
        light,
        KindSelection::Kind(CombatantKind::Hobbit),
        2,
        &mut commands,
    );
    muster.populate(
        light,
        KindSelection::Kind(CombatantKind::Wizard),
        8,
        &mut commands,
    );
    let events = enlist_all(&mut world, commands);

    let enlisted: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::CombatantEnlisted { combatant, .. } => Some(*combatant),
            _ => None,
        })
        .collect();
    let roster: Vec<_> = query::roster(&world, light)
        .iter()
        .map(|snapshot| snapshot.id)
        .collect();

    assert_eq!(roster.len(), 10);
    assert_eq!(roster, enlisted);
    let kinds: Vec<_> = query::roster(&world, light)
        .iter()
        .map(|snapshot| snapshot.kind())
        .collect();
    assert!(kinds[..2].iter().all(|kind| *kind == CombatantKind::Hobbit));
    assert!(kinds[2..].iter().all(|kind| *kind == CombatantKind::Wizard));
}

#[test]
fn identical_seeds_populate_identical_battles() {
    let build = || {
        let mut world = World::default();
        let mut muster = muster(42);
        let mut commands = Vec::new();
        muster.populate(SideId::new(0), KindSelection::Random, 5, &mut commands);
        muster.populate(SideId::new(1), KindSelection::Random, 5, &mut commands);
        let _ = enlist_all(&mut world, commands);
        query::battle_record(&world)
    };

    assert_eq!(build(), build());
}
