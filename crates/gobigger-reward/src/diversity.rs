//! Heading-diversity scoring over a sliding window of move directions

use std::f64::consts::PI;

use crate::buffer::RingBuffer;

/// Movements at or below this magnitude are treated as standing still
const MIN_MOVE_MAGNITUDE: f64 = 0.1;
/// Diversity score above which the bonus is paid
const DIVERSITY_THRESHOLD: f64 = 0.3;
/// Bonus per unit of diversity score
const DIVERSITY_SCALE: f64 = 0.5;

/// Rewards genuine heading changes across the recent window
#[derive(Debug, Clone)]
pub struct MovementDiversityTracker {
    headings: RingBuffer<[f64; 2]>,
    last_score: f64,
    direction_changes: u64,
}

impl MovementDiversityTracker {
    /// Create a tracker over the last `window` headings (at least two)
    #[must_use]
    pub fn new(window: usize) -> Self {
        Self {
            headings: RingBuffer::new(window.max(2)),
            last_score: 0.0,
            direction_changes: 0,
        }
    }

    /// Observe the movement part of an action and return the diversity bonus.
    pub fn observe(&mut self, movement: [f64; 2]) -> f64 {
        let [dx, dy] = movement;
        let magnitude = dx.hypot(dy);
        if !magnitude.is_finite() || magnitude <= MIN_MOVE_MAGNITUDE {
            return 0.0;
        }
        self.headings.push([dx / magnitude, dy / magnitude]);

        if !self.headings.is_full() {
            return 0.0;
        }

        self.last_score = self.diversity_score();
        if self.last_score > DIVERSITY_THRESHOLD {
            self.direction_changes += 1;
            self.last_score * DIVERSITY_SCALE
        } else {
            0.0
        }
    }

    /// Mean angle between consecutive headings, normalized to `[0, 1]`
    #[allow(clippy::cast_precision_loss)]
    fn diversity_score(&self) -> f64 {
        let pairs = self.headings.len().saturating_sub(1).max(1);
        let total: f64 = self
            .headings
            .iter()
            .zip(self.headings.iter().skip(1))
            .map(|(a, b)| (a[0] * b[0] + a[1] * b[1]).clamp(-1.0, 1.0).acos())
            .sum();
        (total / pairs as f64 / PI).clamp(0.0, 1.0)
    }

    /// Score computed on the most recent full window
    #[must_use]
    pub fn last_score(&self) -> f64 {
        self.last_score
    }

    /// Steps on which the diversity bonus was paid
    #[must_use]
    pub fn direction_changes(&self) -> u64 {
        self.direction_changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_straight_line_earns_nothing() {
        let mut tracker = MovementDiversityTracker::new(15);
        let bonuses: Vec<f64> = (0..15).map(|_| tracker.observe([1.0, 0.0])).collect();
        assert!(bonuses.iter().all(|b| *b == 0.0));
        assert_abs_diff_eq!(tracker.last_score(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_right_angle_zigzag() {
        let mut tracker = MovementDiversityTracker::new(15);
        let mut bonus = 0.0;
        for i in 0..15 {
            let heading = if i % 2 == 0 { [1.0, 0.0] } else { [0.0, 1.0] };
            bonus = tracker.observe(heading);
        }
        assert_abs_diff_eq!(tracker.last_score(), 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(bonus, 0.25, epsilon = 1e-9);
        assert_eq!(tracker.direction_changes(), 1);
    }

    #[test]
    fn test_no_bonus_until_window_full() {
        let mut tracker = MovementDiversityTracker::new(4);
        assert_eq!(tracker.observe([1.0, 0.0]), 0.0);
        assert_eq!(tracker.observe([-1.0, 0.0]), 0.0);
        assert_eq!(tracker.observe([1.0, 0.0]), 0.0);
        // full reversal every step scores 1.0
        assert_abs_diff_eq!(tracker.observe([-1.0, 0.0]), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_small_moves_are_ignored() {
        let mut tracker = MovementDiversityTracker::new(2);
        tracker.observe([1.0, 0.0]);
        assert_eq!(tracker.observe([0.05, 0.05]), 0.0);
        assert_eq!(tracker.observe([f64::NAN, 1.0]), 0.0);
        // the ignored moves did not enter the window
        assert_abs_diff_eq!(tracker.observe([0.0, -1.0]), 0.25, epsilon = 1e-9);
    }
}
