//! Creates combatants with sampled stats and rolled gear.

use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::Distribution;
use skirmish_core::{
    round_to_tenth, AttributeRange, CombatantKind, CombatantProfile, Health, KindSelection, Speed,
    Stealth, Strength, Traits, HEALTH_RANGE, SPEED_RANGE, STEALTH_RANGE, STRENGTH_RANGE,
};
use tracing::debug;

use crate::{BoundedNormal, RecruitmentError};

const DEFAULT_RNG_SEED: u64 = 0x6b1d_93c4_2f0e_7a55;

/// Tuning applied by the combatant factory.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FactoryConfig {
    /// Spread used when sampling health, strength and speed.
    pub stat_spread: f64,
    /// Spread used when sampling stealth.
    pub stealth_spread: f64,
    /// Independent chance that an orc carries an axe, and that it is in a fury.
    pub orc_trait_chance: f64,
    /// Independent chance that a nazgul wears a ring, and that it rides hell hawks.
    pub nazgul_trait_chance: f64,
    /// Seed of the factory's random source.
    pub rng_seed: u64,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            stat_spread: 3.0,
            stealth_spread: 2.0,
            orc_trait_chance: 0.5,
            nazgul_trait_chance: 0.3,
            rng_seed: DEFAULT_RNG_SEED,
        }
    }
}

/// Builds combatant profiles for a requested or randomly chosen kind.
///
/// Profiles are not registered anywhere; enlisting them is up to the caller.
#[derive(Debug)]
pub struct CombatantFactory {
    health: BoundedNormal,
    strength: BoundedNormal,
    speed: BoundedNormal,
    stealth: BoundedNormal,
    orc_trait_chance: f64,
    nazgul_trait_chance: f64,
    rng: ChaCha8Rng,
}

impl CombatantFactory {
    /// Creates a factory, validating the spreads and trait chances.
    pub fn new(config: FactoryConfig) -> Result<Self, RecruitmentError> {
        let orc_trait_chance = validate_chance(config.orc_trait_chance)?;
        let nazgul_trait_chance = validate_chance(config.nazgul_trait_chance)?;

        Ok(Self {
            health: sampler_for(HEALTH_RANGE, config.stat_spread)?,
            strength: sampler_for(STRENGTH_RANGE, config.stat_spread)?,
            speed: sampler_for(SPEED_RANGE, config.stat_spread)?,
            stealth: sampler_for(STEALTH_RANGE, config.stealth_spread)?,
            orc_trait_chance,
            nazgul_trait_chance,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        })
    }

    /// Resolves a selection to a concrete kind, drawing uniformly for `Random`.
    pub fn resolve(&mut self, selection: KindSelection) -> CombatantKind {
        match selection {
            KindSelection::Kind(kind) => kind,
            KindSelection::Random => CombatantKind::ALL
                .choose(&mut self.rng)
                .copied()
                .unwrap_or(CombatantKind::Hobbit),
        }
    }

    /// Creates a combatant of the selected kind with sampled stats and gear.
    pub fn create(&mut self, selection: KindSelection) -> CombatantProfile {
        let kind = self.resolve(selection);
        let traits = self.roll_traits(kind);
        self.create_with_traits(traits)
    }

    /// Creates a combatant carrying the supplied payload with sampled stats.
    ///
    /// The payload's stat bonus is added on top of the sampled base values.
    pub fn create_with_traits(&mut self, traits: Traits) -> CombatantProfile {
        let health = round_to_tenth(self.health.sample(&mut self.rng));
        let strength = round_to_tenth(self.strength.sample(&mut self.rng));
        let speed = round_to_tenth(self.speed.sample(&mut self.rng));
        let bonus = traits.stat_bonus();

        let profile = CombatantProfile {
            name: None,
            health: Health::new(health),
            strength: Strength::new(strength + bonus.strength),
            speed: Speed::new(speed + bonus.speed),
            traits,
        };
        debug!(
            kind = %profile.kind(),
            health = profile.health.get(),
            strength = profile.strength.get(),
            speed = profile.speed.get(),
            "combatant created"
        );
        profile
    }

    /// Rolls the variant payload for a kind.
    pub fn roll_traits(&mut self, kind: CombatantKind) -> Traits {
        match kind {
            CombatantKind::Hobbit => Traits::Hobbit {
                stealth: self.roll_stealth(),
            },
            CombatantKind::Wizard => Traits::Wizard {
                stealth: self.roll_stealth(),
            },
            CombatantKind::Orc => Traits::Orc {
                has_axe: self.rng.gen_bool(self.orc_trait_chance),
                has_fury: self.rng.gen_bool(self.orc_trait_chance),
            },
            CombatantKind::Nazgul => Traits::Nazgul {
                has_ring_of_power: self.rng.gen_bool(self.nazgul_trait_chance),
                has_hell_hawks: self.rng.gen_bool(self.nazgul_trait_chance),
            },
        }
    }

    /// Uniform draw in `[0, 1)` from the factory's random source.
    pub(crate) fn unit_draw(&mut self) -> f64 {
        self.rng.gen()
    }

    fn roll_stealth(&mut self) -> Stealth {
        Stealth::new(round_to_tenth(self.stealth.sample(&mut self.rng)))
    }
}

fn sampler_for(range: AttributeRange, spread: f64) -> Result<BoundedNormal, RecruitmentError> {
    Ok(BoundedNormal::new(range.min(), range.max(), spread)?)
}

fn validate_chance(chance: f64) -> Result<f64, RecruitmentError> {
    if (0.0..=1.0).contains(&chance) {
        Ok(chance)
    } else {
        Err(RecruitmentError::InvalidChance { chance })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SamplerError;

    fn factory(seed: u64) -> CombatantFactory {
        CombatantFactory::new(FactoryConfig {
            rng_seed: seed,
            ..FactoryConfig::default()
        })
        .expect("default config is valid")
    }

    #[test]
    fn requested_kind_is_honoured() {
        let mut factory = factory(1);
        for kind in CombatantKind::ALL {
            let profile = factory.create(KindSelection::Kind(kind));
            assert_eq!(profile.kind(), kind);
            assert!(profile.name.is_none());
        }
    }

    #[test]
    fn random_selection_reaches_every_kind() {
        let mut factory = factory(2);
        let mut seen = Vec::new();
        for _ in 0..200 {
            let kind = factory.resolve(KindSelection::Random);
            if !seen.contains(&kind) {
                seen.push(kind);
            }
        }
        assert_eq!(seen.len(), CombatantKind::ALL.len());
    }

    #[test]
    fn sampled_stats_are_rounded_to_tenths() {
        let mut factory = factory(3);
        for _ in 0..50 {
            let profile = factory.create(KindSelection::Kind(CombatantKind::Wizard));
            for value in [
                profile.health.get(),
                profile.strength.get(),
                profile.speed.get(),
            ] {
                assert_eq!(round_to_tenth(value), value);
            }
            let stealth = profile.traits.stealth().expect("wizards carry stealth");
            assert!(STEALTH_RANGE.contains(stealth.get()));
        }
    }

    #[test]
    fn gear_bonus_is_applied_once() {
        let mut with_gear = factory(4);
        let mut without_gear = factory(4);
        let geared = with_gear.create_with_traits(Traits::Orc {
            has_axe: true,
            has_fury: true,
        });
        let plain = without_gear.create_with_traits(Traits::Orc {
            has_axe: false,
            has_fury: false,
        });

        assert_eq!(geared.strength, Strength::new(plain.strength.get() + 5.0));
        assert_eq!(geared.speed, Speed::new(plain.speed.get() + 10.0));
    }

    #[test]
    fn nazgul_gear_is_rarer_than_orc_gear() {
        let mut factory = factory(5);
        let mut orc_axes = 0;
        let mut nazgul_rings = 0;
        for _ in 0..2_000 {
            if let Traits::Orc { has_axe: true, .. } = factory.roll_traits(CombatantKind::Orc) {
                orc_axes += 1;
            }
            if let Traits::Nazgul {
                has_ring_of_power: true,
                ..
            } = factory.roll_traits(CombatantKind::Nazgul)
            {
                nazgul_rings += 1;
            }
        }
        assert!((850..1_150).contains(&orc_axes), "orc axes: {orc_axes}");
        assert!((450..750).contains(&nazgul_rings), "nazgul rings: {nazgul_rings}");
    }

    #[test]
    fn invalid_configuration_is_reported() {
        let spread = CombatantFactory::new(FactoryConfig {
            stat_spread: 0.5,
            ..FactoryConfig::default()
        });
        assert!(matches!(
            spread,
            Err(RecruitmentError::Sampler(SamplerError::InvalidSpread { .. }))
        ));

        let chance = CombatantFactory::new(FactoryConfig {
            orc_trait_chance: 1.5,
            ..FactoryConfig::default()
        });
        assert!(matches!(chance, Err(RecruitmentError::InvalidChance { .. })));
    }

    #[test]
    fn identical_seeds_create_identical_profiles() {
        let mut first = factory(9);
        let mut second = factory(9);
        for _ in 0..20 {
            assert_eq!(
                first.create(KindSelection::Random),
                second.create(KindSelection::Random)
            );
        }
    }
}
