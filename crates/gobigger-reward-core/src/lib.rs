//! Core types for the GoBigger reward-shaping engine
//!
//! This crate holds everything that crosses the boundary between the arena
//! engine, the training wrapper and the reward engine: typed agent states
//! and actions, the reward configuration with its presets, and the named
//! reward components.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod config;
pub mod error;
pub mod preset;
pub mod reward;
pub mod state;

// Re-export core types
pub use action::{ActionType, AgentAction, ACTION_DIM};
pub use config::{ComponentSet, RewardConfig};
pub use error::{RewardError, Result};
pub use preset::Preset;
pub use reward::{component, Reward, RewardComponents};
pub use state::{AgentState, OpponentSnapshot, Position};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        component, AgentAction, AgentState, ComponentSet, Position, Preset, Result, Reward,
        RewardComponents, RewardConfig, RewardError,
    };
}
