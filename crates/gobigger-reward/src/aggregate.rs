//! Combining base reward and weighted components into the step reward

use serde::{Deserialize, Serialize};

use gobigger_reward_core::{RewardComponents, RewardConfig};

/// Unweighted terms that make up the base reward
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BaseReward {
    /// Non-linear score-delta term
    pub score: f64,
    /// Survival term, paid while alive
    pub survival: f64,
    /// Death term, paid once on the terminal step
    pub death: f64,
    /// Time term, paid every step
    pub time: f64,
}

impl BaseReward {
    /// Sum of the base terms
    #[must_use]
    pub fn total(&self) -> f64 {
        self.score + self.survival + self.death + self.time
    }
}

/// Table-driven reward aggregation
#[derive(Debug, Clone, Copy, Default)]
pub struct RewardAggregator;

impl RewardAggregator {
    /// Score-delta term: `sqrt(d) / k` when growing, `d / k'` when shrinking.
    #[must_use]
    pub fn score_term(score_delta: f64, config: &RewardConfig) -> f64 {
        if !score_delta.is_finite() {
            return 0.0;
        }
        if score_delta > 0.0 {
            score_delta.sqrt() / positive(config.score_growth_divisor)
        } else {
            score_delta / positive(config.score_loss_divisor)
        }
    }

    /// Base reward for a step.
    ///
    /// `death_step` is true only on the step the agent is first seen dead.
    #[must_use]
    pub fn base_reward(
        score_delta: f64,
        alive: bool,
        death_step: bool,
        config: &RewardConfig,
    ) -> BaseReward {
        BaseReward {
            score: if alive { Self::score_term(score_delta, config) } else { 0.0 },
            survival: if alive { config.survival_reward } else { 0.0 },
            death: if death_step { config.death_penalty } else { 0.0 },
            time: config.time_penalty,
        }
    }

    /// `Σ weight[name] * value` over every present component
    #[must_use]
    pub fn weighted_sum(components: &RewardComponents, config: &RewardConfig) -> f64 {
        components
            .iter()
            .map(|(name, value)| config.weight(name) * value)
            .sum()
    }

    /// Total reward: base plus weighted components, never NaN or infinite.
    #[must_use]
    pub fn aggregate(base: &BaseReward, components: &RewardComponents, config: &RewardConfig) -> f64 {
        let total = base.total() + Self::weighted_sum(components, config);
        if total.is_finite() {
            total
        } else {
            tracing::warn!(?base, ?components, "non-finite reward replaced by zero");
            0.0
        }
    }
}

fn positive(denominator: f64) -> f64 {
    if denominator.is_finite() && denominator > 0.0 {
        denominator
    } else {
        1.0
    }
}
