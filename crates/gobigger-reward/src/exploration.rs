//! Spatial novelty tracking over a discretized visit map

use std::collections::HashMap;

use gobigger_reward_core::Position;

/// Bonus for entering a cell for the first time this episode
const FIRST_VISIT_BONUS: f64 = 1.0;
/// Extra bonus when the new cell is far from everything visited so far
const DISTANT_CELL_BONUS: f64 = 0.5;
/// Manhattan distance (in cells) that counts as "far"
const DISTANT_CELL_RADIUS: i64 = 3;
/// Numerator of the diminishing revisit bonus
const REVISIT_BONUS: f64 = 0.1;
/// Penalty per visit beyond the bonus limit
const BACKTRACK_STEP: f64 = 0.1;
/// Visits beyond the limit at which the penalty stops growing
const BACKTRACK_CAP: u32 = 5;

/// Integer coordinates of an exploration grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    /// Column
    pub x: i64,
    /// Row
    pub y: i64,
}

impl GridCell {
    /// Cell containing `position` for a grid of `cell_size`
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn containing(position: Position, cell_size: f64) -> Self {
        Self {
            x: (position.x / cell_size).floor() as i64,
            y: (position.y / cell_size).floor() as i64,
        }
    }

    /// Neighbouring cell; saturates at the edge of the `i64` grid.
    fn offset(self, dx: i64, dy: i64) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

/// Result of visiting a position
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Visit {
    /// Non-negative novelty bonus
    pub novelty_bonus: f64,
    /// Non-negative backtrack penalty magnitude
    pub backtrack_penalty: f64,
}

/// Tracks how often each grid cell has been entered during an episode
#[derive(Debug, Clone)]
pub struct ExplorationTracker {
    cell_size: f64,
    max_visits_bonus: u32,
    visits: HashMap<GridCell, u32>,
    total_visits: u64,
}

impl ExplorationTracker {
    /// Create a tracker; a non-positive or non-finite cell size falls back to `1.0`.
    #[must_use]
    pub fn new(cell_size: f64, max_visits_bonus: u32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            max_visits_bonus,
            visits: HashMap::new(),
            total_visits: 0,
        }
    }

    /// Record a visit and score it.
    ///
    /// A missing position scores zero on both terms and leaves the map
    /// untouched.
    pub fn visit(&mut self, position: Option<Position>) -> Visit {
        let Some(position) = position else {
            return Visit::default();
        };
        let cell = GridCell::containing(position, self.cell_size);

        // decided before the insert so the cell does not find itself
        let first_visit = !self.visits.contains_key(&cell);
        let distant = first_visit
            && !self.visits.is_empty()
            && !self.has_neighbour_within(cell, DISTANT_CELL_RADIUS - 1);

        let count = self.visits.entry(cell).or_insert(0);
        *count += 1;
        let count = *count;
        self.total_visits += 1;

        if first_visit {
            let novelty_bonus = if distant {
                FIRST_VISIT_BONUS + DISTANT_CELL_BONUS
            } else {
                FIRST_VISIT_BONUS
            };
            Visit {
                novelty_bonus,
                backtrack_penalty: 0.0,
            }
        } else if count <= self.max_visits_bonus {
            Visit {
                novelty_bonus: REVISIT_BONUS / f64::from(count.max(1)),
                backtrack_penalty: 0.0,
            }
        } else {
            let excess = (count - self.max_visits_bonus).min(BACKTRACK_CAP);
            Visit {
                novelty_bonus: 0.0,
                backtrack_penalty: f64::from(excess) * BACKTRACK_STEP,
            }
        }
    }

    /// Whether any visited cell other than `cell` lies within Manhattan `radius`.
    fn has_neighbour_within(&self, cell: GridCell, radius: i64) -> bool {
        (-radius..=radius).any(|dx| {
            let span = radius - dx.abs();
            (-span..=span)
                .any(|dy| (dx, dy) != (0, 0) && self.visits.contains_key(&cell.offset(dx, dy)))
        })
    }

    /// Visit count of the cell containing `position`
    #[must_use]
    pub fn visit_count(&self, position: Position) -> u32 {
        self.visits
            .get(&GridCell::containing(position, self.cell_size))
            .copied()
            .unwrap_or(0)
    }

    /// Number of distinct cells entered
    #[must_use]
    pub fn unique_cells(&self) -> usize {
        self.visits.len()
    }

    /// Number of recorded visits
    #[must_use]
    pub fn total_visits(&self) -> u64 {
        self.total_visits
    }

    /// Mean visits per entered cell, `0.0` before the first visit
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_visits_per_cell(&self) -> f64 {
        if self.visits.is_empty() {
            0.0
        } else {
            self.total_visits as f64 / self.visits.len() as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn at(x: f64, y: f64) -> Option<Position> {
        Position::new(x, y)
    }

    #[test]
    fn test_first_visit_earns_full_bonus() {
        let mut tracker = ExplorationTracker::new(100.0, 3);
        let visit = tracker.visit(at(50.0, 50.0));
        assert_abs_diff_eq!(visit.novelty_bonus, 1.0);
        assert_abs_diff_eq!(visit.backtrack_penalty, 0.0);
    }

    #[test]
    fn test_revisits_decay_then_penalize() {
        let mut tracker = ExplorationTracker::new(100.0, 3);
        tracker.visit(at(50.0, 50.0));

        let second = tracker.visit(at(10.0, 90.0));
        assert_abs_diff_eq!(second.novelty_bonus, 0.05, epsilon = 1e-12);

        let third = tracker.visit(at(50.0, 50.0));
        assert_abs_diff_eq!(third.novelty_bonus, 0.1 / 3.0, epsilon = 1e-12);

        let fourth = tracker.visit(at(50.0, 50.0));
        assert_abs_diff_eq!(fourth.novelty_bonus, 0.0);
        assert_abs_diff_eq!(fourth.backtrack_penalty, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_backtrack_penalty_is_capped() {
        let mut tracker = ExplorationTracker::new(100.0, 3);
        let mut last = Visit::default();
        for _ in 0..20 {
            last = tracker.visit(at(1.0, 1.0));
        }
        assert_abs_diff_eq!(last.backtrack_penalty, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_distant_new_cell_earns_extra() {
        let mut tracker = ExplorationTracker::new(100.0, 3);
        tracker.visit(at(50.0, 50.0));

        // two cells away: adjacent enough, no extra
        let near = tracker.visit(at(250.0, 50.0));
        assert_abs_diff_eq!(near.novelty_bonus, 1.0);

        // nearest visited cell is (2,0), distance 3
        let far = tracker.visit(at(550.0, 50.0));
        assert_abs_diff_eq!(far.novelty_bonus, 1.5);

        // diagonal distance 1 + 1 = 2 from (5,0)
        let diagonal = tracker.visit(at(650.0, 150.0));
        assert_abs_diff_eq!(diagonal.novelty_bonus, 1.0);

        // diagonal distance 2 + 1 = 3 from (6,1)
        let diagonal_far = tracker.visit(at(850.0, 250.0));
        assert_abs_diff_eq!(diagonal_far.novelty_bonus, 1.5);
    }

    #[test]
    fn test_far_away_positions_do_not_overflow() {
        let mut tracker = ExplorationTracker::new(100.0, 3);
        tracker.visit(at(50.0, 50.0));

        let far = tracker.visit(at(1e300, 0.0));
        assert_abs_diff_eq!(far.novelty_bonus, 1.5);
        let corner = tracker.visit(at(-1e300, 1e300));
        assert_abs_diff_eq!(corner.novelty_bonus, 1.5);
        let again = tracker.visit(at(1e300, 0.0));
        assert_abs_diff_eq!(again.novelty_bonus, 0.05, epsilon = 1e-12);
        assert_eq!(tracker.unique_cells(), 3);
    }

    #[test]
    fn test_negative_coordinates_floor() {
        let cell = GridCell::containing(Position { x: -0.5, y: 99.9 }, 100.0);
        assert_eq!(cell, GridCell { x: -1, y: 0 });
    }

    #[test]
    fn test_missing_position_scores_zero() {
        let mut tracker = ExplorationTracker::new(100.0, 3);
        assert_eq!(tracker.visit(None), Visit::default());
        assert_eq!(tracker.unique_cells(), 0);
        assert_abs_diff_eq!(tracker.avg_visits_per_cell(), 0.0);
    }

    #[test]
    fn test_stats() {
        let mut tracker = ExplorationTracker::new(100.0, 3);
        for (x, y) in [(5.0, 5.0), (5.0, 5.0), (150.0, 5.0), (5.0, 5.0)] {
            tracker.visit(at(x, y));
        }
        assert_eq!(tracker.unique_cells(), 2);
        assert_eq!(tracker.total_visits(), 4);
        assert_abs_diff_eq!(tracker.avg_visits_per_cell(), 2.0);
        assert_eq!(tracker.visit_count(Position { x: 0.0, y: 0.0 }), 3);
    }
}
