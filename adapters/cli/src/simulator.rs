//! Drives the world and its systems in response to control requests.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use skirmish_core::{
    BattleState, BattleView, CombatantId, CombatantProfile, Command, Event, KindSelection, SideId,
};
use skirmish_persistence::BattleStore;
use skirmish_rendering::{PositionSink, Presenter};
use skirmish_system_battle_clock::BattleClock;
use skirmish_system_recruitment::{CombatantFactory, LineInput, ManualEntry, Muster};
use skirmish_world::{self as world, query, SideConfig, World};
use tracing::{info, warn};

use crate::config::BattleConfig;

/// Owns a battle and pumps every command through the world and its systems.
pub(crate) struct Simulator<S> {
    world: World,
    clock: BattleClock,
    muster: Muster,
    presenter: Presenter,
    store: BattleStore,
    sink: S,
    tick: Duration,
    time_limit: Duration,
}

impl<S: PositionSink> Simulator<S> {
    pub(crate) fn new(config: &BattleConfig, sink: S) -> Result<Self> {
        let factory =
            CombatantFactory::new(config.factory()).context("invalid recruitment tuning")?;
        let sides = config.sides.clone().map(|side| {
            let color = side.color();
            SideConfig::new(side.name, color)
        });

        Ok(Self {
            world: World::new(sides),
            clock: BattleClock::new(config.clock()),
            muster: Muster::new(factory),
            presenter: Presenter::new(),
            store: BattleStore::new(&config.save_path),
            sink,
            tick: config.tick(),
            time_limit: config.time_limit(),
        })
    }

    pub(crate) fn view(&self) -> BattleView {
        query::battle_view(&self.world)
    }

    pub(crate) fn elapsed(&self) -> Duration {
        query::elapsed(&self.world)
    }

    /// Resolves a side from its index or its case-insensitive name.
    pub(crate) fn resolve_side(&self, name: &str) -> Result<SideId> {
        let name = name.trim();
        let view = self.view();
        let side = view
            .sides()
            .find(|side| {
                side.name.eq_ignore_ascii_case(name) || side.id.get().to_string() == name
            })
            .map(|side| side.id)
            .ok_or_else(|| anyhow!("no side named '{name}'"));
        side
    }

    /// Enlists the muster orders of every configured side.
    pub(crate) fn muster_all(&mut self, config: &BattleConfig) -> Result<()> {
        let sides = query::side_ids(&self.world);
        for (side, setup) in sides.into_iter().zip(&config.sides) {
            for order in &setup.muster {
                self.populate(side, order.kind, order.count)?;
            }
        }
        Ok(())
    }

    pub(crate) fn populate(
        &mut self,
        side: SideId,
        selection: KindSelection,
        count: usize,
    ) -> Result<()> {
        let mut commands = Vec::with_capacity(count);
        self.muster.populate(side, selection, count, &mut commands);
        for command in commands {
            self.execute(command)?;
        }
        Ok(())
    }

    pub(crate) fn run(&mut self) -> Result<()> {
        self.execute(Command::Run)
    }

    pub(crate) fn suspend(&mut self) -> Result<()> {
        self.execute(Command::Suspend)
    }

    pub(crate) fn suspend_side(&mut self, side: SideId) -> Result<()> {
        self.execute(Command::SuspendSide { side })
    }

    pub(crate) fn resume_side(&mut self, side: SideId) -> Result<()> {
        self.execute(Command::ResumeSide { side })
    }

    pub(crate) fn clear(&mut self) -> Result<()> {
        self.execute(Command::Clear)
    }

    pub(crate) fn clear_side(&mut self, side: SideId) -> Result<()> {
        self.execute(Command::ClearSide { side })
    }

    /// Advances the battle by `span` of simulated time in fixed ticks.
    pub(crate) fn step(&mut self, span: Duration) -> Result<()> {
        let mut remaining = span;
        while !remaining.is_zero() && query::battle_state(&self.world) == BattleState::Running {
            let dt = remaining.min(self.tick);
            self.execute(Command::Tick { dt })?;
            remaining -= dt;
        }
        Ok(())
    }

    /// Ticks until the battle stops running or the time limit passes.
    pub(crate) fn play_out(&mut self) -> Result<BattleState> {
        while query::battle_state(&self.world) == BattleState::Running
            && self.elapsed() < self.time_limit
        {
            self.execute(Command::Tick { dt: self.tick })?;
        }

        let state = query::battle_state(&self.world);
        if state == BattleState::Running {
            warn!(
                elapsed_secs = self.elapsed().as_secs_f64(),
                "time limit reached without a winner"
            );
        }
        Ok(state)
    }

    pub(crate) fn save(&self) -> Result<()> {
        self.store
            .save(&query::battle_record(&self.world))
            .context("failed to save battle")?;
        info!(path = %self.store.path().display(), "battle saved");
        Ok(())
    }

    /// Replaces the live battle with the saved one.
    ///
    /// The file is decoded completely before the world is touched.
    pub(crate) fn restore(&mut self) -> Result<()> {
        let record = self.store.load().context("failed to restore battle")?;
        self.execute(Command::RestoreBattle { record })?;
        info!(path = %self.store.path().display(), "battle restored");
        Ok(())
    }

    /// Walks through the stats of `combatant` and applies the answers.
    pub(crate) fn edit<I>(&mut self, combatant: CombatantId, input: &mut I) -> Result<()>
    where
        I: LineInput + ?Sized,
    {
        let snapshot = query::combatant(&self.world, combatant)
            .with_context(|| format!("no combatant with id {}", combatant.get()))?;
        let current = CombatantProfile {
            name: Some(snapshot.name),
            health: snapshot.health,
            strength: snapshot.strength,
            speed: snapshot.speed,
            traits: snapshot.traits,
        };
        let profile = ManualEntry::new(input).edit(&current);
        self.execute(Command::EditCombatant { combatant, profile })
    }

    fn execute(&mut self, command: Command) -> Result<()> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);

        while !events.is_empty() {
            let view = self.view();
            self.presenter
                .present(&events, &view, &mut self.sink)
                .context("presentation failed")?;
            report(&events, &view);

            let mut commands = Vec::new();
            self.clock.handle(&events, &view, &mut commands);

            events.clear();
            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
        }
        Ok(())
    }
}

fn report(events: &[Event], view: &BattleView) {
    let side_name = |id: SideId| view.side(id).map_or("?", |side| side.name.as_str());
    for event in events {
        match event {
            Event::BattleConcluded { winner } => {
                info!(winner = side_name(*winner), "battle concluded");
            }
            Event::EnlistRejected { side, reason } => {
                warn!(side = side.get(), reason = ?reason, "enlist rejected");
            }
            Event::CombatantDied { combatant, side } => {
                info!(combatant = combatant.get(), side = side_name(*side), "combatant fell");
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use anyhow::Result as AnyResult;
    use glam::Vec2;
    use skirmish_core::CombatantKind;
    use skirmish_rendering::DisplayDescriptor;

    #[derive(Default)]
    struct CountingSink {
        shown: usize,
        animated: usize,
        hidden: usize,
    }

    impl PositionSink for CountingSink {
        fn show(&mut self, _descriptor: &DisplayDescriptor) -> AnyResult<()> {
            self.shown += 1;
            Ok(())
        }

        fn animate_to(&mut self, _: CombatantId, _: Vec2, _: Duration) -> AnyResult<()> {
            self.animated += 1;
            Ok(())
        }

        fn hide(&mut self, _: CombatantId) -> AnyResult<()> {
            self.hidden += 1;
            Ok(())
        }
    }

    struct Answers(VecDeque<&'static str>);

    impl LineInput for Answers {
        fn read_line(&mut self, _prompt: &str) -> Option<String> {
            self.0.pop_front().map(str::to_owned)
        }
    }

    fn simulator(save_path: &std::path::Path) -> Simulator<CountingSink> {
        let config = BattleConfig {
            save_path: save_path.to_path_buf(),
            ..BattleConfig::default()
        };
        Simulator::new(&config, CountingSink::default()).expect("default config is valid")
    }

    fn roster_sizes(view: &BattleView) -> Vec<usize> {
        view.sides().map(|side| side.roster.len()).collect()
    }

    #[test]
    fn default_battle_is_fought_to_a_finish_or_the_time_limit() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut sim = simulator(&dir.path().join("battle.ser"));
        sim.muster_all(&BattleConfig::default()).expect("muster");
        assert_eq!(roster_sizes(&sim.view()), vec![10, 8]);
        assert_eq!(sim.sink.shown, 18);

        sim.run().expect("run");
        let state = sim.play_out().expect("play out");

        match state {
            BattleState::Concluded { winner } => {
                let view = sim.view();
                let loser = view.opponents_of(winner).expect("two sides");
                assert!(loser.roster.is_empty());
            }
            BattleState::Running => assert!(sim.elapsed() >= sim.time_limit),
            other => panic!("unexpected state {other:?}"),
        }
        assert!(sim.sink.animated > 0);
    }

    #[test]
    fn sides_resolve_by_name_or_index() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sim = simulator(&dir.path().join("battle.ser"));

        assert_eq!(sim.resolve_side("dark").expect("dark"), SideId::new(1));
        assert_eq!(sim.resolve_side("0").expect("index"), SideId::new(0));
        assert!(sim.resolve_side("rohan").is_err());
    }

    #[test]
    fn step_stops_when_battle_is_not_running() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut sim = simulator(&dir.path().join("battle.ser"));
        sim.populate(SideId::new(0), KindSelection::Random, 2)
            .expect("populate");

        sim.step(Duration::from_secs(1)).expect("step");
        assert_eq!(sim.elapsed(), Duration::ZERO);

        sim.run().expect("run");
        sim.step(Duration::from_millis(120)).expect("step");
        assert_eq!(sim.elapsed(), Duration::from_millis(120));
    }

    #[test]
    fn save_and_restore_replace_the_live_battle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut sim = simulator(&dir.path().join("battle.ser"));
        sim.populate(SideId::new(0), KindSelection::Kind(CombatantKind::Hobbit), 3)
            .expect("populate");
        sim.populate(SideId::new(1), KindSelection::Kind(CombatantKind::Orc), 3)
            .expect("populate");
        sim.save().expect("save");

        sim.clear().expect("clear");
        assert_eq!(roster_sizes(&sim.view()), vec![0, 0]);
        assert_eq!(sim.sink.hidden, 6);

        sim.restore().expect("restore");
        let view = sim.view();
        assert_eq!(roster_sizes(&view), vec![3, 3]);
        assert_eq!(view.state(), BattleState::Populating);
        assert_eq!(sim.sink.shown, 12);
    }

    #[test]
    fn failed_restore_leaves_battle_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("battle.ser");
        std::fs::write(&path, b"SKRM\x00\x09").expect("write");

        let mut sim = simulator(&path);
        sim.populate(SideId::new(1), KindSelection::Kind(CombatantKind::Nazgul), 2)
            .expect("populate");

        assert!(sim.restore().is_err());
        assert_eq!(roster_sizes(&sim.view()), vec![0, 2]);
    }

    #[test]
    fn edit_applies_answers_through_manual_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut sim = simulator(&dir.path().join("battle.ser"));
        sim.populate(SideId::new(1), KindSelection::Kind(CombatantKind::Orc), 1)
            .expect("populate");
        let id = sim
            .view()
            .sides()
            .flat_map(|side| side.roster.iter())
            .map(|combatant| combatant.id)
            .next()
            .expect("one orc");

        let mut answers = Answers(VecDeque::from(["Grishnakh", "", "250", "", "no", "yes"]));
        sim.edit(id, &mut answers).expect("edit");

        let view = sim.view();
        let orc = view.combatant(id).expect("still enlisted");
        assert_eq!(orc.name, "Grishnakh");
        assert_eq!(orc.strength.get(), 100.0);
        assert!(matches!(
            orc.traits,
            skirmish_core::Traits::Orc {
                has_axe: false,
                has_fury: true
            }
        ));
        assert!(sim.edit(CombatantId::new(999), &mut answers).is_err());
    }
}
