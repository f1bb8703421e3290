//! End-of-episode statistics

use serde::{Deserialize, Serialize};

/// Read-only summary of the current episode
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EpisodeStats {
    /// Distinct grid cells entered
    pub unique_cells_visited: usize,
    /// Mean visits per entered cell
    pub avg_visits_per_cell: f64,
    /// Fraction of steps on which the diversity bonus was paid
    pub direction_diversity_score: f64,
    /// Splits requested
    pub total_splits: u64,
    /// Splits classified smart
    pub efficient_splits: u64,
    /// Splits classified wasteful
    pub wasted_splits: u64,
    /// Splits later matched to eating
    pub correlated_splits: u64,
    /// Splits that expired unmatched
    pub expired_splits: u64,
    /// Steps processed
    pub steps: u64,
    /// Sum of step rewards
    pub total_reward: f64,
}

impl EpisodeStats {
    /// Share of splits classified smart, `0.0` without splits
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn split_efficiency_ratio(&self) -> f64 {
        self.efficient_splits as f64 / self.total_splits.max(1) as f64
    }
}
