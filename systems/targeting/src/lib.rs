#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that picks the nearest opponent a combatant can see.

use skirmish_core::{CombatantId, CombatantView, Position};

/// Opponent selected as the next target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetLock {
    /// Identifier of the chosen opponent.
    pub opponent: CombatantId,
    /// Position of the opponent when it was chosen.
    pub position: Position,
    /// Euclidean distance from the searching combatant.
    pub distance: f64,
}

/// Finds the visible, living opponent closest to `origin`.
///
/// Candidates are scanned in roster order; a later candidate only replaces the
/// current best when strictly closer, so ties go to the earliest enlisted.
/// Hidden opponents are never returned.
#[must_use]
pub fn nearest_visible_opponent(origin: Position, opponents: &CombatantView) -> Option<TargetLock> {
    let mut best: Option<TargetLock> = None;

    for candidate in opponents.iter() {
        if !candidate.is_visible() || !candidate.is_alive() {
            continue;
        }

        let distance = origin.distance_to(candidate.position);
        if best.map_or(true, |current| distance < current.distance) {
            best = Some(TargetLock {
                opponent: candidate.id,
                position: candidate.position,
                distance,
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{
        CombatantPhase, CombatantSnapshot, Health, SideId, Speed, Stealth, Strength, Traits,
    };

    fn snapshot(id: u32, x: f64, y: f64, traits: Traits) -> CombatantSnapshot {
        CombatantSnapshot {
            id: CombatantId::new(id),
            side: SideId::new(1),
            name: format!("Opponent{id}"),
            health: Health::new(50.0),
            strength: Strength::new(50.0),
            speed: Speed::new(50.0),
            position: Position::new(x, y),
            traits,
            phase: CombatantPhase::Idle,
        }
    }

    fn orc() -> Traits {
        Traits::Orc {
            has_axe: false,
            has_fury: false,
        }
    }

    #[test]
    fn picks_the_closest_candidate() {
        let view = CombatantView::from_snapshots(vec![
            snapshot(1, 100.0, 0.0, orc()),
            snapshot(2, 30.0, 40.0, orc()),
            snapshot(3, 60.0, 0.0, orc()),
        ]);

        let lock = nearest_visible_opponent(Position::new(0.0, 0.0), &view).expect("target");
        assert_eq!(lock.opponent, CombatantId::new(2));
        assert_eq!(lock.distance, 50.0);
    }

    #[test]
    fn ties_go_to_the_earliest_enlisted() {
        let view = CombatantView::from_snapshots(vec![
            snapshot(7, 10.0, 0.0, orc()),
            snapshot(3, 0.0, 10.0, orc()),
        ]);

        let lock = nearest_visible_opponent(Position::new(0.0, 0.0), &view).expect("target");
        assert_eq!(lock.opponent, CombatantId::new(7));
    }

    #[test]
    fn hidden_opponents_are_skipped_even_when_closer() {
        let hidden_hobbit = Traits::Hobbit {
            stealth: Stealth::new(50.0),
        };
        let riding_nazgul = Traits::Nazgul {
            has_ring_of_power: true,
            has_hell_hawks: true,
        };
        let view = CombatantView::from_snapshots(vec![
            snapshot(1, 1.0, 0.0, hidden_hobbit),
            snapshot(2, 2.0, 0.0, riding_nazgul),
            snapshot(3, 300.0, 0.0, orc()),
        ]);

        let lock = nearest_visible_opponent(Position::new(0.0, 0.0), &view).expect("target");
        assert_eq!(lock.opponent, CombatantId::new(3));
    }

    #[test]
    fn nothing_is_found_when_every_opponent_hides() {
        let view = CombatantView::from_snapshots(vec![snapshot(
            1,
            1.0,
            0.0,
            Traits::Wizard {
                stealth: Stealth::new(51.0),
            },
        )]);
        assert_eq!(nearest_visible_opponent(Position::new(0.0, 0.0), &view), None);
        assert_eq!(
            nearest_visible_opponent(Position::new(0.0, 0.0), &CombatantView::default()),
            None
        );
    }

    #[test]
    fn fallen_opponents_are_skipped() {
        let mut fallen = snapshot(1, 1.0, 0.0, orc());
        fallen.health = Health::new(0.0);
        let view =
            CombatantView::from_snapshots(vec![fallen, snapshot(2, 20.0, 0.0, orc())]);

        let lock = nearest_visible_opponent(Position::new(0.0, 0.0), &view).expect("target");
        assert_eq!(lock.opponent, CombatantId::new(2));
    }
}
