//! Multi-agent reward engine
//!
//! Wraps one [`RewardEngine`] per agent and one [`TeamRankEvaluator`] per
//! team. Agents are processed in roster order, so reward maps are stable
//! across runs.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use gobigger_reward_core::{component, AgentState, Result, RewardConfig};

use crate::engine::{RewardEngine, StepReward};
use crate::stats::EpisodeStats;
use crate::team_rank::{TeamId, TeamRankEvaluator, TeamRankSnapshot};

/// Agent identifier
pub type AgentId = String;

/// Per-tick information shared by all agents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInfo {
    /// Tick index
    pub step_index: u64,
    /// Current team standings, if the arena reports them this tick
    #[serde(default)]
    pub team_ranks: Vec<TeamRankSnapshot>,
}

#[derive(Debug, Clone)]
struct AgentSlot {
    team: TeamId,
    engine: RewardEngine,
    previous: Option<AgentState>,
}

/// Reward engine for a roster of agents grouped into teams
#[derive(Debug, Clone)]
pub struct MultiAgentRewardEngine {
    config: RewardConfig,
    agents: IndexMap<AgentId, AgentSlot>,
    teams: IndexMap<TeamId, TeamRankEvaluator>,
}

impl MultiAgentRewardEngine {
    /// Create an engine for `roster`, a list of `(agent, team)` pairs.
    pub fn new<I, A>(config: RewardConfig, roster: I) -> Result<Self>
    where
        I: IntoIterator<Item = (A, TeamId)>,
        A: Into<AgentId>,
    {
        config.validate()?;
        let mut agents = IndexMap::new();
        let mut teams = IndexMap::new();
        for (agent, team) in roster {
            teams
                .entry(team)
                .or_insert_with(|| TeamRankEvaluator::new(&config));
            agents.insert(
                agent.into(),
                AgentSlot {
                    team,
                    engine: RewardEngine::new(config.clone())?,
                    previous: None,
                },
            );
        }
        tracing::debug!(agents = agents.len(), teams = teams.len(), "multi-agent engine created");
        Ok(Self {
            config,
            agents,
            teams,
        })
    }

    /// Engine configuration
    #[must_use]
    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    /// Agents in roster order
    pub fn agents(&self) -> impl Iterator<Item = &str> {
        self.agents.keys().map(String::as_str)
    }

    /// Team of `agent`
    #[must_use]
    pub fn team_of(&self, agent: &str) -> Option<TeamId> {
        self.agents.get(agent).map(|slot| slot.team)
    }

    /// Per-agent engine
    #[must_use]
    pub fn agent(&self, agent: &str) -> Option<&RewardEngine> {
        self.agents.get(agent).map(|slot| &slot.engine)
    }

    /// Start a new episode for every agent and team.
    pub fn reset(&mut self) {
        for slot in self.agents.values_mut() {
            slot.engine.reset();
            slot.previous = None;
        }
        for evaluator in self.teams.values_mut() {
            *evaluator = TeamRankEvaluator::new(&self.config);
        }
    }

    /// Reward every rostered agent for one tick.
    ///
    /// An agent without a state is treated as dead; one without a valid
    /// action is treated as idle. States of agents outside the roster are
    /// ignored.
    pub fn step_all(
        &mut self,
        states: &HashMap<AgentId, AgentState>,
        actions: &HashMap<AgentId, Vec<f64>>,
        info: &StepInfo,
    ) -> IndexMap<AgentId, StepReward> {
        let opponents_enabled = self.config.enabled.opponents;
        let mut rewards = IndexMap::with_capacity(self.agents.len());

        for (id, slot) in &mut self.agents {
            let current = states.get(id);
            let action = actions.get(id).map_or(&[][..], Vec::as_slice);
            let mut outcome = slot
                .engine
                .step(slot.previous.as_ref(), current, action, info.step_index);

            if opponents_enabled && outcome.opponents_eaten > 0 {
                if let Some(evaluator) = self.teams.get(&slot.team) {
                    let bonus = evaluator.on_opponent_eaten(outcome.opponents_eaten);
                    slot.engine.credit(&mut outcome, component::EAT_OPPONENT_BONUS, bonus);
                }
            }

            slot.previous = current.cloned();
            rewards.insert(id.clone(), outcome);
        }

        for snapshot in &info.team_ranks {
            match self.teams.get_mut(&snapshot.team_id) {
                Some(evaluator) => evaluator.observe_rank(*snapshot),
                None => tracing::debug!(team = snapshot.team_id, "rank for unknown team ignored"),
            }
        }

        rewards
    }

    /// Terminal team bonuses, paid to every member of each ranked team.
    ///
    /// The bonus is credited as the `team_rank` component, so its weight
    /// applies. Agents whose team is not ranked receive nothing.
    pub fn on_episode_end(&mut self, ranks: &[TeamRankSnapshot]) -> IndexMap<AgentId, f64> {
        let mut team_bonus: HashMap<TeamId, f64> = HashMap::new();
        for snapshot in ranks {
            match self.teams.get_mut(&snapshot.team_id) {
                Some(evaluator) => {
                    team_bonus.insert(snapshot.team_id, evaluator.on_episode_end(*snapshot));
                }
                None => tracing::debug!(team = snapshot.team_id, "rank for unknown team ignored"),
            }
        }

        self.agents
            .iter_mut()
            .filter_map(|(id, slot)| {
                let bonus = *team_bonus.get(&slot.team)?;
                let weighted = slot.engine.credit_terminal(component::TEAM_RANK, bonus);
                Some((id.clone(), weighted))
            })
            .collect()
    }

    /// Episode statistics per agent, in roster order
    #[must_use]
    pub fn episode_stats(&self) -> IndexMap<AgentId, EpisodeStats> {
        self.agents
            .iter()
            .map(|(id, slot)| (id.clone(), slot.engine.episode_stats()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use gobigger_reward_core::{OpponentSnapshot, Preset};

    fn roster() -> Vec<(&'static str, TeamId)> {
        vec![("a0", 0), ("a1", 0), ("b0", 1), ("b1", 1)]
    }

    fn engine() -> MultiAgentRewardEngine {
        MultiAgentRewardEngine::new(Preset::MultiAgent.config(), roster()).unwrap()
    }

    fn states(score: f64) -> HashMap<AgentId, AgentState> {
        roster()
            .into_iter()
            .enumerate()
            .map(|(i, (id, _))| {
                #[allow(clippy::cast_precision_loss)]
                let x = i as f64 * 1000.0;
                (id.to_string(), AgentState::at(x, 0.0, score))
            })
            .collect()
    }

    fn rank(team_id: TeamId, rank: u32) -> TeamRankSnapshot {
        TeamRankSnapshot {
            team_id,
            rank,
            total_teams: 2,
        }
    }

    #[test]
    fn test_rewards_follow_roster_order() {
        let mut engine = engine();
        let rewards = engine.step_all(&states(100.0), &HashMap::new(), &StepInfo::default());
        let order: Vec<&str> = rewards.keys().map(String::as_str).collect();
        assert_eq!(order, ["a0", "a1", "b0", "b1"]);
    }

    #[test]
    fn test_missing_state_counts_as_death() {
        let mut engine = engine();
        let mut current = states(100.0);
        engine.step_all(&current, &HashMap::new(), &StepInfo::default());

        current.remove("b1");
        let rewards = engine.step_all(
            &current,
            &HashMap::new(),
            &StepInfo {
                step_index: 1,
                ..StepInfo::default()
            },
        );
        let death_penalty = engine.config().death_penalty;
        assert_abs_diff_eq!(rewards["b1"].base.death, death_penalty);
        assert_abs_diff_eq!(rewards["a0"].base.death, 0.0);
    }

    #[test]
    fn test_terminal_bonus_goes_to_whole_team() {
        let mut engine = engine();
        engine.step_all(
            &states(100.0),
            &HashMap::new(),
            &StepInfo {
                step_index: 0,
                team_ranks: vec![rank(0, 2), rank(1, 1)],
            },
        );
        let bonuses = engine.on_episode_end(&[rank(0, 1), rank(1, 2)]);
        let config = engine.config();

        // team 0 was promoted, team 1 demoted
        let winner = config.rank_weight + config.rank_promotion_bonus;
        let loser = 0.5 * config.rank_weight + config.rank_demotion_penalty;
        assert_abs_diff_eq!(bonuses["a0"], winner, epsilon = 1e-9);
        assert_abs_diff_eq!(bonuses["a1"], winner, epsilon = 1e-9);
        assert_abs_diff_eq!(bonuses["b0"], loser, epsilon = 1e-9);
        assert_abs_diff_eq!(bonuses["b1"], loser, epsilon = 1e-9);
    }

    #[test]
    fn test_terminal_bonus_uses_team_rank_weight() {
        let config = Preset::MultiAgent
            .config()
            .with_weight(component::TEAM_RANK, 0.5);
        let mut engine = MultiAgentRewardEngine::new(config, roster()).unwrap();
        let bonuses = engine.on_episode_end(&[rank(0, 1)]);

        let expected = 0.5 * engine.config().rank_weight;
        assert_abs_diff_eq!(bonuses["a0"], expected, epsilon = 1e-9);
        let stats = engine.episode_stats();
        assert_abs_diff_eq!(stats["a1"].total_reward, expected, epsilon = 1e-9);
        assert_abs_diff_eq!(stats["b0"].total_reward, 0.0);
    }

    #[test]
    fn test_unranked_team_gets_nothing() {
        let mut engine = engine();
        let bonuses = engine.on_episode_end(&[rank(0, 1), rank(7, 2)]);
        assert_eq!(bonuses.len(), 2);
        assert!(!bonuses.contains_key("b0"));
    }

    #[test]
    fn test_eaten_opponent_credited() {
        let mut engine = engine();
        let config = engine.config().clone();
        let prey = |cells| {
            vec![OpponentSnapshot {
                id: "b0".into(),
                cell_count: cells,
            }]
        };

        let mut current = states(100.0);
        let hunter = current["a0"].clone();
        current.insert("a0".into(), hunter.clone().with_opponents(prey(3)));
        engine.step_all(&current, &HashMap::new(), &StepInfo::default());

        current.insert("a0".into(), hunter.with_opponents(prey(0)));
        let rewards = engine.step_all(
            &current,
            &HashMap::new(),
            &StepInfo {
                step_index: 1,
                ..StepInfo::default()
            },
        );
        let a0 = &rewards["a0"];
        assert_eq!(a0.opponents_eaten, 1);
        assert_abs_diff_eq!(
            a0.components.get(component::EAT_OPPONENT_BONUS),
            config.opponent_eaten_bonus
        );
        assert!(!rewards["a1"].components.contains(component::EAT_OPPONENT_BONUS));
    }

    #[test]
    fn test_reset_forgets_ranks_and_states() {
        let mut engine = engine();
        engine.step_all(
            &states(100.0),
            &HashMap::new(),
            &StepInfo {
                step_index: 0,
                team_ranks: vec![rank(0, 2)],
            },
        );
        engine.reset();

        let bonuses = engine.on_episode_end(&[rank(0, 1)]);
        let config = engine.config();
        // no promotion: the earlier rank belonged to the previous episode
        assert_abs_diff_eq!(bonuses["a0"], config.rank_weight, epsilon = 1e-9);
        assert!(engine.episode_stats().values().all(|s| s.steps == 0));
    }

    #[test]
    fn test_unknown_agents_ignored() {
        let mut engine = engine();
        let mut current = states(100.0);
        current.insert("stranger".into(), AgentState::at(0.0, 0.0, 1.0));
        let rewards = engine.step_all(&current, &HashMap::new(), &StepInfo::default());
        assert_eq!(rewards.len(), 4);
        assert_eq!(engine.team_of("a1"), Some(0));
        assert_eq!(engine.team_of("stranger"), None);
    }
}
