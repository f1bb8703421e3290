//! Per-step reward shaping for GoBigger agents
//!
//! This crate turns raw arena observations into shaped rewards:
//! - Spatial exploration with diminishing revisit bonuses
//! - Movement diversity over a sliding window of headings
//! - Split classification and split-to-eat correlation
//! - Team rank and opponent elimination bonuses for multi-agent play
//!
//! [`RewardEngine`] serves a single agent, [`MultiAgentRewardEngine`] a
//! roster of agents grouped into teams.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregate;
pub mod buffer;
pub mod diversity;
pub mod engine;
pub mod exploration;
pub mod food;
pub mod multi_agent;
pub mod split;
pub mod stats;
pub mod team_rank;

// Re-export engines
pub use engine::{EpisodeState, RewardEngine, StepReward};
pub use multi_agent::{AgentId, MultiAgentRewardEngine, StepInfo};
pub use stats::EpisodeStats;

// Re-export trackers
pub use aggregate::{BaseReward, RewardAggregator};
pub use buffer::RingBuffer;
pub use diversity::MovementDiversityTracker;
pub use exploration::{ExplorationTracker, GridCell, Visit};
pub use food::FoodEfficiencyEstimator;
pub use split::{Correlation, SplitCounters, SplitEventCorrelator, SplitPolicy, SplitVerdict};
pub use team_rank::{OpponentWatch, TeamId, TeamRankEvaluator, TeamRankSnapshot};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        EpisodeStats, MultiAgentRewardEngine, RewardEngine, StepInfo, StepReward,
        TeamRankSnapshot,
    };
    pub use gobigger_reward_core::prelude::*;
}
