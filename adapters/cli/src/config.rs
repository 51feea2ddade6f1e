//! TOML configuration of a headless battle.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use skirmish_core::{CombatantKind, KindSelection, SideColor};
use skirmish_system_battle_clock::Config as ClockConfig;
use skirmish_system_recruitment::FactoryConfig;

const DEFAULT_SEED: u64 = 0x5eed_ba77_1e00_0001;

/// Complete description of a battle and how to simulate it.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct BattleConfig {
    pub(crate) sides: [SideSetup; 2],
    pub(crate) recruitment: RecruitmentTuning,
    pub(crate) clock: ClockTuning,
    pub(crate) simulation: SimulationTuning,
    pub(crate) save_path: PathBuf,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            sides: [
                SideSetup {
                    name: "Light".to_owned(),
                    color: [0.0, 1.0, 1.0, 1.0],
                    muster: vec![
                        MusterOrder::new(CombatantKind::Hobbit, 2),
                        MusterOrder::new(CombatantKind::Wizard, 8),
                    ],
                },
                SideSetup {
                    name: "Dark".to_owned(),
                    color: [1.0, 0.0, 0.0, 1.0],
                    muster: vec![
                        MusterOrder::new(CombatantKind::Nazgul, 4),
                        MusterOrder::new(CombatantKind::Orc, 4),
                    ],
                },
            ],
            recruitment: RecruitmentTuning::default(),
            clock: ClockTuning::default(),
            simulation: SimulationTuning::default(),
            save_path: PathBuf::from("battlefield.ser"),
        }
    }
}

impl BattleConfig {
    /// Reads the configuration at `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read battle config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid battle config at {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse battle config toml contents")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.simulation.tick_ms == 0 {
            bail!("simulation.tick_ms must be positive");
        }
        for side in &self.sides {
            if side.name.trim().is_empty() {
                bail!("side names must not be empty");
            }
        }
        Ok(())
    }

    pub(crate) fn factory(&self) -> FactoryConfig {
        FactoryConfig {
            stat_spread: self.recruitment.stat_spread,
            stealth_spread: self.recruitment.stealth_spread,
            orc_trait_chance: self.recruitment.orc_trait_chance,
            nazgul_trait_chance: self.recruitment.nazgul_trait_chance,
            rng_seed: self.recruitment.seed,
        }
    }

    pub(crate) fn clock(&self) -> ClockConfig {
        ClockConfig::new(
            self.clock.combat_threshold,
            self.clock.weak_health_floor,
            self.clock.seed,
        )
    }

    pub(crate) fn tick(&self) -> Duration {
        Duration::from_millis(self.simulation.tick_ms)
    }

    pub(crate) fn time_limit(&self) -> Duration {
        Duration::from_secs(self.simulation.time_limit_secs)
    }

    /// Reseeds every random source from a single value.
    pub(crate) fn reseed(&mut self, seed: u64) {
        self.recruitment.seed = seed;
        self.clock.seed = seed.rotate_left(32);
    }
}

/// Name, color and initial roster of one side.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct SideSetup {
    pub(crate) name: String,
    #[serde(default = "opaque_white")]
    pub(crate) color: [f64; 4],
    #[serde(default)]
    pub(crate) muster: Vec<MusterOrder>,
}

impl SideSetup {
    pub(crate) fn color(&self) -> SideColor {
        let [red, green, blue, alpha] = self.color;
        SideColor::new(red, green, blue, alpha)
    }
}

fn opaque_white() -> [f64; 4] {
    [1.0, 1.0, 1.0, 1.0]
}

/// Request for `count` combatants of a kind, or of random kinds.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct MusterOrder {
    pub(crate) kind: KindSelection,
    pub(crate) count: usize,
}

impl MusterOrder {
    const fn new(kind: CombatantKind, count: usize) -> Self {
        Self {
            kind: KindSelection::Kind(kind),
            count,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RecruitmentTuning {
    pub(crate) stat_spread: f64,
    pub(crate) stealth_spread: f64,
    pub(crate) orc_trait_chance: f64,
    pub(crate) nazgul_trait_chance: f64,
    pub(crate) seed: u64,
}

impl Default for RecruitmentTuning {
    fn default() -> Self {
        let factory = FactoryConfig::default();
        Self {
            stat_spread: factory.stat_spread,
            stealth_spread: factory.stealth_spread,
            orc_trait_chance: factory.orc_trait_chance,
            nazgul_trait_chance: factory.nazgul_trait_chance,
            seed: DEFAULT_SEED,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ClockTuning {
    pub(crate) combat_threshold: f64,
    pub(crate) weak_health_floor: f64,
    pub(crate) seed: u64,
}

impl Default for ClockTuning {
    fn default() -> Self {
        let clock = ClockConfig::default();
        Self {
            combat_threshold: clock.combat_threshold(),
            weak_health_floor: clock.weak_health_floor(),
            seed: DEFAULT_SEED.rotate_left(32),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SimulationTuning {
    pub(crate) tick_ms: u64,
    pub(crate) time_limit_secs: u64,
}

impl Default for SimulationTuning {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            time_limit_secs: 300,
        }
    }
}
