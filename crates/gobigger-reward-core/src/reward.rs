//! Reward signals and named reward components

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known component names used by the engine and the weight table
pub mod component {
    /// Novelty bonus for entering grid cells
    pub const EXPLORATION_BONUS: &str = "exploration_bonus";
    /// Penalty magnitude for over-visited cells
    pub const BACKTRACK_PENALTY: &str = "backtrack_penalty";
    /// Heading-change bonus
    pub const DIVERSITY_BONUS: &str = "diversity_bonus";
    /// Immediate bonus for a well-timed split
    pub const SMART_SPLIT_BONUS: &str = "smart_split_bonus";
    /// Immediate penalty magnitude for a badly-timed split
    pub const WASTE_SPLIT_PENALTY: &str = "waste_split_penalty";
    /// Deferred bonus for a split that was followed by eating
    pub const SPLIT_TO_EAT_BONUS: &str = "split_to_eat_bonus";
    /// Deferred penalty magnitude for a split that never paid off
    pub const EXPIRED_SPLIT_PENALTY: &str = "expired_split_penalty";
    /// Bounded score-growth efficiency
    pub const FOOD_EFFICIENCY: &str = "food_efficiency";
    /// Bonus for eliminating opponents
    pub const EAT_OPPONENT_BONUS: &str = "eat_opponent_bonus";
    /// Terminal team-rank bonus
    pub const TEAM_RANK: &str = "team_rank";
}

/// Reward signal
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Reward(pub f64);

impl Reward {
    /// Create a new reward
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the reward value
    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for Reward {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<Reward> for f64 {
    fn from(reward: Reward) -> Self {
        reward.0
    }
}

impl std::ops::Add for Reward {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self(self.0 + other.0)
    }
}

impl std::ops::AddAssign for Reward {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl std::ops::Mul<f64> for Reward {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self::Output {
        Self(self.0 * scalar)
    }
}

/// Unweighted reward components produced for a single step.
///
/// Ordered by name so that aggregation and serialization are deterministic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RewardComponents(BTreeMap<String, f64>);

impl RewardComponents {
    /// Create an empty component map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a component value, replacing any previous value
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    /// Value of a component, `0.0` when absent
    #[must_use]
    pub fn get(&self, name: &str) -> f64 {
        self.0.get(name).copied().unwrap_or(0.0)
    }

    /// Whether a component is present
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Iterate over `(name, value)` pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of components
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no component is present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for RewardComponents {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
