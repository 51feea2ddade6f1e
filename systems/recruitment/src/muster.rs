//! Plans the enlistment of freshly created combatants into a side.

use skirmish_core::{Command, Family, KindSelection, Position, Recruit, SideId};
use tracing::info;

use crate::CombatantFactory;

/// Maximum offset added to each axis of a family's rally point.
pub const FORMATION_JITTER: f64 = 35.0;

/// Point of the battlefield around which a family gathers when populated.
#[must_use]
pub const fn rally_point(family: Family) -> Position {
    match family {
        Family::Stealth => Position::new(440.0, 160.0),
        Family::Warband => Position::new(700.0, 340.0),
    }
}

/// Turns populate requests into enlist commands.
#[derive(Debug)]
pub struct Muster {
    factory: CombatantFactory,
}

impl Muster {
    /// Creates a muster drawing combatants from the provided factory.
    #[must_use]
    pub fn new(factory: CombatantFactory) -> Self {
        Self { factory }
    }

    /// Emits one enlist command per requested combatant, placed near the
    /// rally point of the combatant's family.
    pub fn populate(
        &mut self,
        side: SideId,
        selection: KindSelection,
        count: usize,
        out: &mut Vec<Command>,
    ) {
        for _ in 0..count {
            let profile = self.factory.create(selection);
            let rally = rally_point(profile.kind().family());
            let position = Position::clamped(
                rally.x() + FORMATION_JITTER * self.factory.unit_draw(),
                rally.y() + FORMATION_JITTER * self.factory.unit_draw(),
            );
            out.push(Command::Enlist {
                side,
                recruit: Recruit { profile, position },
            });
        }
        info!(
            side = side.get(),
            selection = ?selection,
            count,
            "side populated"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FactoryConfig;
    use skirmish_core::CombatantKind;

    fn muster() -> Muster {
        Muster::new(CombatantFactory::new(FactoryConfig::default()).expect("valid config"))
    }

    #[test]
    fn populate_emits_one_enlist_per_combatant() {
        let mut muster = muster();
        let mut commands = Vec::new();
        muster.populate(
            SideId::new(0),
            KindSelection::Kind(CombatantKind::Hobbit),
            3,
            &mut commands,
        );

        assert_eq!(commands.len(), 3);
        for command in commands {
            match command {
                Command::Enlist { side, recruit } => {
                    assert_eq!(side, SideId::new(0));
                    assert_eq!(recruit.profile.kind(), CombatantKind::Hobbit);
                    assert!((440.0..475.0).contains(&recruit.position.x()));
                    assert!((160.0..195.0).contains(&recruit.position.y()));
                }
                other => panic!("unexpected command emitted: {other:?}"),
            }
        }
    }

    #[test]
    fn warband_gathers_at_its_own_rally_point() {
        let mut muster = muster();
        let mut commands = Vec::new();
        muster.populate(
            SideId::new(1),
            KindSelection::Kind(CombatantKind::Nazgul),
            4,
            &mut commands,
        );

        assert_eq!(commands.len(), 4);
        for command in &commands {
            match command {
                Command::Enlist { recruit, .. } => {
                    assert!((700.0..735.0).contains(&recruit.position.x()));
                    assert!((340.0..375.0).contains(&recruit.position.y()));
                }
                other => panic!("unexpected command emitted: {other:?}"),
            }
        }
    }

    #[test]
    fn zero_count_emits_nothing() {
        let mut muster = muster();
        let mut commands = Vec::new();
        muster.populate(SideId::new(0), KindSelection::Random, 0, &mut commands);
        assert!(commands.is_empty());
    }
}
