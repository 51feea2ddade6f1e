#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Battle clock system that decides each combatant's next step whenever the
//! world reports it ready: fall, wait, fight or close in on the nearest
//! visible opponent.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use skirmish_core::{
    BattleState, BattleView, CombatRoll, CombatantId, CombatantSnapshot, Command, Event,
};
use skirmish_system_targeting::{nearest_visible_opponent, TargetLock};
use tracing::debug;

const DEFAULT_RNG_SEED: u64 = 0x1d4c_a7e2_58f3_b906;

/// Configuration parameters required to construct the battle clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    combat_threshold: f64,
    weak_health_floor: f64,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration.
    ///
    /// Opponents closer than `combat_threshold` are fought instead of
    /// approached. Combatants below `weak_health_floor` hold their ground.
    #[must_use]
    pub const fn new(combat_threshold: f64, weak_health_floor: f64, rng_seed: u64) -> Self {
        Self {
            combat_threshold,
            weak_health_floor,
            rng_seed,
        }
    }

    /// Distance below which opponents fight.
    #[must_use]
    pub const fn combat_threshold(&self) -> f64 {
        self.combat_threshold
    }

    /// Health below which a combatant stops advancing.
    #[must_use]
    pub const fn weak_health_floor(&self) -> f64 {
        self.weak_health_floor
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(4.0, 15.0, DEFAULT_RNG_SEED)
    }
}

/// Pure system that turns `CombatantReady` events into the next command for
/// each ready combatant.
#[derive(Debug)]
pub struct BattleClock {
    combat_threshold: f64,
    weak_health_floor: f64,
    rng: ChaCha8Rng,
}

impl BattleClock {
    /// Creates a new battle clock using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            combat_threshold: config.combat_threshold,
            weak_health_floor: config.weak_health_floor,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes world events and the battle snapshot to emit commands.
    pub fn handle(&mut self, events: &[Event], battle: &BattleView, out: &mut Vec<Command>) {
        if battle.state() != BattleState::Running {
            return;
        }

        for event in events {
            if let Event::CombatantReady { combatant } = event {
                self.step(*combatant, battle, out);
            }
        }
    }

    fn step(&mut self, id: CombatantId, battle: &BattleView, out: &mut Vec<Command>) {
        let Some(mover) = battle.combatant(id) else {
            return;
        };

        if !mover.is_alive() {
            out.push(Command::RemoveCombatant { combatant: id });
            return;
        }

        let Some(target) = battle
            .opponents_of(mover.side)
            .and_then(|opponents| nearest_visible_opponent(mover.position, &opponents.roster))
        else {
            debug!(combatant = id.get(), "no visible opponent; staying idle");
            return;
        };

        if target.distance < self.combat_threshold {
            out.push(Command::Engage {
                attacker: id,
                defender: target.opponent,
                attacker_roll: CombatRoll::new(self.rng.gen()),
                defender_roll: CombatRoll::new(self.rng.gen()),
            });
        } else {
            out.push(self.approach(mover, target));
        }
    }

    fn approach(&self, mover: &CombatantSnapshot, target: TargetLock) -> Command {
        let waypoint = if mover.health.get() < self.weak_health_floor {
            mover.position
        } else {
            mover.position.midpoint(target.position)
        };
        let secs = target.distance / mover.speed.get();
        let duration = Duration::try_from_secs_f64(secs).unwrap_or_else(|error| {
            debug!(combatant = mover.id.get(), secs, %error, "move duration fell back to zero");
            Duration::ZERO
        });

        Command::MoveCombatant {
            combatant: mover.id,
            waypoint: waypoint.clamp_to_battlefield(),
            duration,
        }
    }
}
