#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that chooses a tower's target among the enemies in range.

use endless_defence_core::{EnemyId, TargetMode, WorldPoint};

/// Enemy offered to the targeting system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetCandidate {
    /// Identifier of the enemy.
    pub enemy: EnemyId,
    /// Current world position of the enemy.
    pub position: WorldPoint,
    /// Position along the path in segment units.
    pub progress: f32,
    /// Remaining hit points.
    pub hp: f32,
}

/// Enemy chosen by the targeting system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Identifier of the chosen enemy.
    pub enemy: EnemyId,
    /// Position of the chosen enemy when it was selected.
    pub position: WorldPoint,
    /// Distance between the tower and the chosen enemy.
    pub distance: f32,
}

/// Tower targeting system applying the target-mode policies.
#[derive(Debug, Default)]
pub struct TowerTargeting;

impl TowerTargeting {
    /// Creates a new tower targeting system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Selects a target for a tower located at `origin`.
    ///
    /// Only candidates within `range` (inclusive) are considered. Among them
    /// the `mode` decides; when two candidates score equally the one
    /// encountered first in `candidates` is kept. Callers are expected to
    /// pass live enemies only.
    pub fn select<I>(
        &self,
        mode: TargetMode,
        origin: WorldPoint,
        range: f32,
        candidates: I,
    ) -> Option<TowerTarget>
    where
        I: IntoIterator<Item = TargetCandidate>,
    {
        let mut best: Option<BestCandidate> = None;

        for candidate in candidates {
            let distance = origin.distance_to(candidate.position);
            if !(distance <= range) {
                continue;
            }

            let current = BestCandidate {
                candidate,
                distance,
            };

            match &mut best {
                Some(existing) => {
                    if current.precedes(existing, mode) {
                        *existing = current;
                    }
                }
                None => best = Some(current),
            }
        }

        best.map(|best| TowerTarget {
            enemy: best.candidate.enemy,
            position: best.candidate.position,
            distance: best.distance,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    candidate: TargetCandidate,
    distance: f32,
}

impl BestCandidate {
    fn precedes(&self, other: &Self, mode: TargetMode) -> bool {
        match mode {
            TargetMode::First => self.candidate.progress > other.candidate.progress,
            TargetMode::Last => self.candidate.progress < other.candidate.progress,
            TargetMode::Nearest => self.distance < other.distance,
            TargetMode::Strongest => self.candidate.hp > other.candidate.hp,
            TargetMode::Weakest => self.candidate.hp < other.candidate.hp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: u32, x: f32, progress: f32, hp: f32) -> TargetCandidate {
        TargetCandidate {
            enemy: EnemyId::new(id),
            position: WorldPoint::new(x, 0.0),
            progress,
            hp,
        }
    }

    fn select(mode: TargetMode, candidates: Vec<TargetCandidate>) -> Option<EnemyId> {
        TowerTargeting::new()
            .select(mode, WorldPoint::new(0.0, 0.0), 100.0, candidates)
            .map(|target| target.enemy)
    }

    fn mixed() -> Vec<TargetCandidate> {
        vec![
            candidate(1, 60.0, 2.0, 40.0),
            candidate(2, 20.0, 5.0, 10.0),
            candidate(3, 90.0, 1.0, 80.0),
            candidate(4, 150.0, 9.0, 500.0),
        ]
    }

    #[test]
    fn first_prefers_most_progress_in_range() {
        assert_eq!(select(TargetMode::First, mixed()), Some(EnemyId::new(2)));
    }

    #[test]
    fn last_prefers_least_progress() {
        assert_eq!(select(TargetMode::Last, mixed()), Some(EnemyId::new(3)));
    }

    #[test]
    fn nearest_prefers_smallest_distance() {
        assert_eq!(select(TargetMode::Nearest, mixed()), Some(EnemyId::new(2)));
    }

    #[test]
    fn strongest_ignores_out_of_range_giants() {
        assert_eq!(
            select(TargetMode::Strongest, mixed()),
            Some(EnemyId::new(3))
        );
    }

    #[test]
    fn weakest_prefers_fewest_hit_points() {
        assert_eq!(select(TargetMode::Weakest, mixed()), Some(EnemyId::new(2)));
    }

    #[test]
    fn ties_resolve_to_first_encountered() {
        let tied = vec![
            candidate(7, 50.0, 3.0, 20.0),
            candidate(5, 50.0, 3.0, 20.0),
        ];
        for mode in TargetMode::ALL {
            assert_eq!(select(mode, tied.clone()), Some(EnemyId::new(7)), "{mode}");
        }
    }

    #[test]
    fn range_boundary_is_inclusive() {
        let edge = vec![candidate(1, 100.0, 0.0, 1.0)];
        assert_eq!(select(TargetMode::First, edge), Some(EnemyId::new(1)));
    }

    #[test]
    fn no_candidates_in_range_produces_no_target() {
        let far = vec![candidate(1, 100.5, 0.0, 1.0)];
        assert_eq!(select(TargetMode::First, far), None);
        assert_eq!(select(TargetMode::First, Vec::new()), None);
    }

    #[test]
    fn reports_distance_to_chosen_enemy() {
        let target = TowerTargeting::new()
            .select(
                TargetMode::Nearest,
                WorldPoint::new(0.0, 0.0),
                10.0,
                vec![TargetCandidate {
                    enemy: EnemyId::new(9),
                    position: WorldPoint::new(3.0, 4.0),
                    progress: 0.0,
                    hp: 1.0,
                }],
            )
            .expect("target in range");
        assert_eq!(target.distance, 5.0);
    }
}
