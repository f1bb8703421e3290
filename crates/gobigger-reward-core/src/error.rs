//! Error types for the reward core library

use thiserror::Error;

/// Core error type for reward-engine construction and boundary decoding.
///
/// Per-step reward computation never returns this type; malformed step
/// input resolves to conservative defaults instead.
#[derive(Error, Debug)]
pub enum RewardError {
    /// Configuration value out of its valid range
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Unknown reward preset name
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    /// Invalid action vector
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for reward operations
pub type Result<T> = std::result::Result<T, RewardError>;
