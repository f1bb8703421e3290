//! Per-agent reward engine
//!
//! One [`RewardEngine`] serves one agent. It owns an [`EpisodeState`] that
//! is only ever produced fresh (by the constructor or by [`RewardEngine::reset`]),
//! so tracker state cannot leak from one episode into the next.

use serde::{Deserialize, Serialize};

use gobigger_reward_core::{
    component, AgentAction, AgentState, Preset, Result, Reward, RewardComponents, RewardConfig,
};

use crate::aggregate::{BaseReward, RewardAggregator};
use crate::diversity::MovementDiversityTracker;
use crate::exploration::ExplorationTracker;
use crate::food::FoodEfficiencyEstimator;
use crate::split::{SplitEventCorrelator, SplitPolicy};
use crate::stats::EpisodeStats;
use crate::team_rank::OpponentWatch;

/// Outcome of a single step
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StepReward {
    /// Final scalar reward
    pub reward: Reward,
    /// Unweighted base terms
    pub base: BaseReward,
    /// Unweighted shaping components
    pub components: RewardComponents,
    /// Opponents eliminated during the step
    pub opponents_eaten: u32,
}

/// All mutable per-episode state of one agent
#[derive(Debug, Clone)]
pub struct EpisodeState {
    exploration: ExplorationTracker,
    diversity: MovementDiversityTracker,
    splits: SplitEventCorrelator,
    opponents: OpponentWatch,
    steps: u64,
    dead: bool,
    total_reward: f64,
}

impl EpisodeState {
    fn new(config: &RewardConfig) -> Self {
        let policy = SplitPolicy {
            food_threshold: config.smart_split_food_threshold,
            interval_threshold: config.smart_split_interval_threshold,
            score_threshold: config.smart_split_score_threshold,
            max_cells: config.smart_split_max_cells,
            efficiency_window: config.split_efficiency_window,
            split_capacity: config.split_queue_capacity,
            eat_capacity: config.eat_queue_capacity,
        };
        Self {
            exploration: ExplorationTracker::new(config.cell_size, config.max_visits_bonus),
            diversity: MovementDiversityTracker::new(config.diversity_window),
            splits: SplitEventCorrelator::new(policy),
            opponents: OpponentWatch::new(),
            steps: 0,
            dead: false,
            total_reward: 0.0,
        }
    }

    fn stats(&self) -> EpisodeStats {
        let counters = self.splits.counters();
        #[allow(clippy::cast_precision_loss)]
        let direction_diversity_score =
            self.diversity.direction_changes() as f64 / self.steps.max(1) as f64;
        EpisodeStats {
            unique_cells_visited: self.exploration.unique_cells(),
            avg_visits_per_cell: self.exploration.avg_visits_per_cell(),
            direction_diversity_score,
            total_splits: counters.total,
            efficient_splits: counters.smart,
            wasted_splits: counters.wasted,
            correlated_splits: counters.correlated,
            expired_splits: counters.expired,
            steps: self.steps,
            total_reward: self.total_reward,
        }
    }
}

/// Reward engine for a single agent
#[derive(Debug, Clone)]
pub struct RewardEngine {
    config: RewardConfig,
    food: FoodEfficiencyEstimator,
    episode: EpisodeState,
}

impl RewardEngine {
    /// Create an engine after validating `config`
    pub fn new(config: RewardConfig) -> Result<Self> {
        config.validate()?;
        let episode = EpisodeState::new(&config);
        Ok(Self {
            config,
            food: FoodEfficiencyEstimator,
            episode,
        })
    }

    /// Create an engine from a built-in preset
    pub fn from_preset(preset: Preset) -> Result<Self> {
        Self::new(preset.config())
    }

    /// Engine configuration
    #[must_use]
    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    /// Discard all episode state.
    pub fn reset(&mut self) {
        if self.episode.steps > 0 {
            let stats = self.episode.stats();
            tracing::info!(
                steps = stats.steps,
                total_reward = stats.total_reward,
                unique_cells = stats.unique_cells_visited,
                splits = stats.total_splits,
                correlated = stats.correlated_splits,
                "episode finished"
            );
            metrics::increment_counter!("gobigger_reward.episodes");
        }
        self.episode = EpisodeState::new(&self.config);
    }

    /// Compute the reward for one tick from a raw action vector.
    ///
    /// A malformed action is treated as a no-op; a missing or dead current
    /// state is treated as death.
    pub fn step(
        &mut self,
        prev: Option<&AgentState>,
        curr: Option<&AgentState>,
        action: &[f64],
        step_index: u64,
    ) -> StepReward {
        self.step_action(prev, curr, AgentAction::sanitize(action), step_index)
    }

    /// Compute the reward for one tick from a decoded action.
    pub fn step_action(
        &mut self,
        prev: Option<&AgentState>,
        curr: Option<&AgentState>,
        action: AgentAction,
        step_index: u64,
    ) -> StepReward {
        self.episode.steps += 1;
        let enabled = self.config.enabled;
        let mut components = RewardComponents::new();
        let mut opponents_eaten = 0;

        let base = match curr.filter(|state| !state.is_dead()) {
            None => {
                let death_step = !self.episode.dead;
                self.episode.dead = true;
                if enabled.exploration {
                    components.insert(component::EXPLORATION_BONUS, 0.0);
                    components.insert(component::BACKTRACK_PENALTY, 0.0);
                }
                if enabled.diversity {
                    components.insert(component::DIVERSITY_BONUS, 0.0);
                }
                if enabled.split {
                    for name in [
                        component::SMART_SPLIT_BONUS,
                        component::WASTE_SPLIT_PENALTY,
                        component::SPLIT_TO_EAT_BONUS,
                        component::EXPIRED_SPLIT_PENALTY,
                    ] {
                        components.insert(name, 0.0);
                    }
                }
                if enabled.food_efficiency {
                    components.insert(component::FOOD_EFFICIENCY, 0.0);
                }
                if death_step {
                    tracing::debug!(step = step_index, "agent died");
                }
                RewardAggregator::base_reward(0.0, false, death_step, &self.config)
            }
            Some(state) => {
                self.episode.dead = false;
                let prev = prev.filter(|p| !p.is_dead());
                let score_delta = prev
                    .map(|p| state.score - p.score)
                    .filter(|d| d.is_finite())
                    .unwrap_or(0.0);

                if enabled.exploration {
                    let visit = self.episode.exploration.visit(state.position);
                    components.insert(component::EXPLORATION_BONUS, visit.novelty_bonus);
                    components.insert(component::BACKTRACK_PENALTY, visit.backtrack_penalty);
                }

                if enabled.diversity {
                    let bonus = self.episode.diversity.observe(action.movement());
                    components.insert(component::DIVERSITY_BONUS, bonus);
                }

                if enabled.split {
                    let splits = &mut self.episode.splits;
                    if score_delta > 0.0 {
                        splits.on_score_growth(step_index);
                    }
                    if !state.eaten_opponents.is_empty() {
                        splits.on_eat(step_index, state.eaten_opponents.clone());
                    }
                    // judge the split on the state the agent saw when choosing it
                    let decision = prev.unwrap_or(state);
                    let verdict = splits.on_action(
                        action.is_split(),
                        step_index,
                        decision.visible_food_count,
                        decision.score,
                        decision.cell_count,
                    );
                    let correlation = splits.correlate(step_index);
                    components.insert(component::SMART_SPLIT_BONUS, verdict.smart_bonus);
                    components.insert(component::WASTE_SPLIT_PENALTY, verdict.waste_penalty);
                    components.insert(component::SPLIT_TO_EAT_BONUS, f64::from(correlation.matched));
                    components.insert(component::EXPIRED_SPLIT_PENALTY, f64::from(correlation.expired));
                }

                if enabled.food_efficiency {
                    components.insert(component::FOOD_EFFICIENCY, self.food.estimate(score_delta));
                }

                if enabled.opponents {
                    opponents_eaten = self
                        .episode
                        .opponents
                        .observe(&state.visible_opponents, &state.eaten_opponents);
                }

                RewardAggregator::base_reward(score_delta, true, false, &self.config)
            }
        };

        let reward = RewardAggregator::aggregate(&base, &components, &self.config);
        self.episode.total_reward += reward;
        tracing::trace!(step = step_index, reward, "step rewarded");

        StepReward {
            reward: Reward(reward),
            base,
            components,
            opponents_eaten,
        }
    }

    /// Add an externally computed component to a step outcome, weighting it
    /// like any other component.
    pub fn credit(&mut self, outcome: &mut StepReward, name: &str, value: f64) {
        let weighted = self.config.weight(name) * value;
        if !weighted.is_finite() {
            tracing::warn!(name, value, "non-finite component ignored");
            return;
        }
        outcome.components.insert(name, outcome.components.get(name) + value);
        outcome.reward += Reward(weighted);
        self.episode.total_reward += weighted;
    }

    /// Weight a component paid outside any step (e.g. at episode end), add
    /// it to the episode total and return the weighted value.
    pub fn credit_terminal(&mut self, name: &str, value: f64) -> f64 {
        let weighted = self.config.weight(name) * value;
        if !weighted.is_finite() {
            tracing::warn!(name, value, "non-finite terminal component ignored");
            return 0.0;
        }
        self.episode.total_reward += weighted;
        weighted
    }

    /// Statistics of the current episode
    #[must_use]
    pub fn episode_stats(&self) -> EpisodeStats {
        self.episode.stats()
    }

    /// Split events still awaiting correlation
    #[must_use]
    pub fn pending_splits(&self) -> usize {
        self.episode.splits.pending_splits()
    }
}

impl Default for RewardEngine {
    fn default() -> Self {
        let config = RewardConfig::default();
        let episode = EpisodeState::new(&config);
        Self {
            config,
            food: FoodEfficiencyEstimator,
            episode,
        }
    }
}
