//! Reward engine configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::reward::component;
use crate::{RewardError, Result};

/// Which shaping components an engine computes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ComponentSet {
    /// Grid novelty bonus and backtrack penalty
    pub exploration: bool,
    /// Heading-diversity bonus
    pub diversity: bool,
    /// Split classification and split/eat correlation
    pub split: bool,
    /// Bounded score-growth efficiency
    pub food_efficiency: bool,
    /// Opponent elimination tracking
    pub opponents: bool,
}

impl Default for ComponentSet {
    fn default() -> Self {
        Self {
            exploration: true,
            diversity: true,
            split: true,
            food_efficiency: true,
            opponents: false,
        }
    }
}

/// Configuration for a reward engine.
///
/// Immutable for the lifetime of an engine. The weight table is the tuning
/// surface: every component's unweighted value is multiplied by its weight,
/// and names missing from the table weigh `1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Component name to weight
    pub weights: BTreeMap<String, f64>,
    /// Enabled components
    pub enabled: ComponentSet,

    /// Side length of an exploration grid cell
    pub cell_size: f64,
    /// Visit count up to which revisits still earn a diminishing bonus
    pub max_visits_bonus: u32,
    /// Number of recent headings used for the diversity score
    pub diversity_window: usize,
    /// Steps after a split during which eating is attributed to it
    pub split_efficiency_window: u64,
    /// Minimum visible food for a smart split
    pub smart_split_food_threshold: u32,
    /// Minimum steps since the previous split for a smart split
    pub smart_split_interval_threshold: u64,
    /// Minimum score for a smart split
    pub smart_split_score_threshold: f64,
    /// Maximum clone balls for a smart split
    pub smart_split_max_cells: u32,
    /// Pending split events kept per agent
    pub split_queue_capacity: usize,
    /// Pending eat events kept per agent
    pub eat_queue_capacity: usize,

    /// Divisor applied to `sqrt(delta)` for score growth
    pub score_growth_divisor: f64,
    /// Divisor applied to negative score deltas
    pub score_loss_divisor: f64,
    /// Per-step reward while alive
    pub survival_reward: f64,
    /// One-off reward on the terminal (death) step
    pub death_penalty: f64,
    /// Per-step reward applied unconditionally
    pub time_penalty: f64,

    /// Scale of the terminal rank reward
    pub rank_weight: f64,
    /// Added when the team rank improved since the previous observation
    pub rank_promotion_bonus: f64,
    /// Added when the team rank worsened since the previous observation
    pub rank_demotion_penalty: f64,
    /// Bonus per eliminated opponent
    pub opponent_eaten_bonus: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        let weights = [
            (component::EXPLORATION_BONUS, 2.0),
            (component::BACKTRACK_PENALTY, -0.5),
            (component::DIVERSITY_BONUS, 1.0),
            (component::SMART_SPLIT_BONUS, 3.0),
            (component::WASTE_SPLIT_PENALTY, -2.0),
            (component::SPLIT_TO_EAT_BONUS, 2.0),
            (component::EXPIRED_SPLIT_PENALTY, -1.0),
            (component::FOOD_EFFICIENCY, 1.5),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            weights,
            enabled: ComponentSet::default(),
            cell_size: 100.0,
            max_visits_bonus: 3,
            diversity_window: 10,
            split_efficiency_window: 50,
            smart_split_food_threshold: 3,
            smart_split_interval_threshold: 30,
            smart_split_score_threshold: 2000.0,
            smart_split_max_cells: 8,
            split_queue_capacity: 5,
            eat_queue_capacity: 20,
            score_growth_divisor: 20.0,
            score_loss_divisor: 100.0,
            survival_reward: 0.01,
            death_penalty: -50.0,
            time_penalty: -0.001,
            rank_weight: 1.0,
            rank_promotion_bonus: 2.0,
            rank_demotion_penalty: -3.0,
            opponent_eaten_bonus: 15.0,
        }
    }
}

impl RewardConfig {
    /// Weight of a component; unknown names weigh `1.0`.
    #[must_use]
    pub fn weight(&self, name: &str) -> f64 {
        self.weights.get(name).copied().unwrap_or(1.0)
    }

    /// Return a copy with one weight replaced
    #[must_use]
    pub fn with_weight(mut self, name: impl Into<String>, weight: f64) -> Self {
        self.weights.insert(name.into(), weight);
        self
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(RewardError::InvalidConfig(format!(
                "cell_size must be finite and > 0, got {}",
                self.cell_size
            )));
        }
        if self.diversity_window < 2 {
            return Err(RewardError::InvalidConfig(
                "diversity_window must be >= 2".into(),
            ));
        }
        if self.split_efficiency_window == 0 {
            return Err(RewardError::InvalidConfig(
                "split_efficiency_window must be >= 1".into(),
            ));
        }
        if self.split_queue_capacity == 0 || self.eat_queue_capacity == 0 {
            return Err(RewardError::InvalidConfig(
                "event queue capacities must be >= 1".into(),
            ));
        }
        if self.score_growth_divisor <= 0.0 || self.score_loss_divisor <= 0.0 {
            return Err(RewardError::InvalidConfig(
                "score divisors must be > 0".into(),
            ));
        }

        let scalars = [
            ("smart_split_score_threshold", self.smart_split_score_threshold),
            ("survival_reward", self.survival_reward),
            ("death_penalty", self.death_penalty),
            ("time_penalty", self.time_penalty),
            ("rank_weight", self.rank_weight),
            ("rank_promotion_bonus", self.rank_promotion_bonus),
            ("rank_demotion_penalty", self.rank_demotion_penalty),
            ("opponent_eaten_bonus", self.opponent_eaten_bonus),
            ("score_growth_divisor", self.score_growth_divisor),
            ("score_loss_divisor", self.score_loss_divisor),
        ];
        let weights = self.weights.iter().map(|(k, v)| (k.as_str(), *v));
        if let Some((name, value)) = scalars.into_iter().chain(weights).find(|(_, v)| !v.is_finite()) {
            return Err(RewardError::InvalidConfig(format!(
                "{name} must be finite, got {value}"
            )));
        }

        Ok(())
    }
}
