//! Mutual damage exchange between two combatants standing within reach.

use skirmish_core::{CombatRoll, Health, Strength};

/// Stats that take part in a combat round.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Duelist {
    pub(crate) health: Health,
    pub(crate) strength: Strength,
}

/// Health of both participants once the round settles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct RoundOutcome {
    pub(crate) attacker: Health,
    pub(crate) defender: Health,
}

/// Resolves one round. Both hits land simultaneously: each side's damage is
/// computed from the other's strength before either health changes.
pub(crate) fn exchange_blows(
    attacker: Duelist,
    defender: Duelist,
    attacker_roll: CombatRoll,
    defender_roll: CombatRoll,
) -> RoundOutcome {
    RoundOutcome {
        attacker: attacker
            .health
            .after_damage(attacker_roll.damage_from(defender.strength)),
        defender: defender
            .health
            .after_damage(defender_roll.damage_from(attacker.strength)),
    }
}
