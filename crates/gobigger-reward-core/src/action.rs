//! Agent actions as submitted to the arena engine

use serde::{Deserialize, Serialize};

use crate::{RewardError, Result};

/// Number of entries in a raw action vector: `[move_x, move_y, action_type]`
pub const ACTION_DIM: usize = 3;

/// Discrete part of an agent action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Plain movement
    #[default]
    Move,
    /// Split every clone ball in two
    Split,
    /// Eject a spore
    Eject,
}

impl ActionType {
    /// Decode the wire code (`0=move, 1=split, 2=eject`)
    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Move),
            1 => Some(Self::Split),
            2 => Some(Self::Eject),
            _ => None,
        }
    }

    /// Wire code of this action type
    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Self::Move => 0,
            Self::Split => 1,
            Self::Eject => 2,
        }
    }
}

/// A decoded agent action
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentAction {
    /// Horizontal movement in `[-1, 1]`
    pub move_x: f64,
    /// Vertical movement in `[-1, 1]`
    pub move_y: f64,
    /// Discrete action
    pub action_type: ActionType,
}

impl AgentAction {
    /// The no-op action: stand still, no split, no eject.
    #[must_use]
    pub fn noop() -> Self {
        Self::default()
    }

    /// Create a new action
    #[must_use]
    pub fn new(move_x: f64, move_y: f64, action_type: ActionType) -> Self {
        Self {
            move_x,
            move_y,
            action_type,
        }
    }

    /// Strictly decode a raw action vector.
    ///
    /// The vector must hold exactly three finite values, movement in
    /// `[-1, 1]` and an integral action code in `{0, 1, 2}`.
    pub fn try_from_slice(raw: &[f64]) -> Result<Self> {
        if raw.len() != ACTION_DIM {
            return Err(RewardError::DimensionMismatch {
                expected: ACTION_DIM,
                actual: raw.len(),
            });
        }
        if let Some(v) = raw.iter().find(|v| !v.is_finite()) {
            return Err(RewardError::InvalidAction(format!("non-finite value {v}")));
        }
        let (move_x, move_y) = (raw[0], raw[1]);
        if move_x.abs() > 1.0 || move_y.abs() > 1.0 {
            return Err(RewardError::InvalidAction(format!(
                "movement ({move_x}, {move_y}) outside [-1, 1]"
            )));
        }
        let code = raw[2];
        #[allow(clippy::cast_possible_truncation)]
        let action_type = (code.fract() == 0.0)
            .then(|| ActionType::from_code(code as i64))
            .flatten()
            .ok_or_else(|| RewardError::InvalidAction(format!("action type {code}")))?;

        Ok(Self::new(move_x, move_y, action_type))
    }

    /// Decode a raw action vector, falling back to [`AgentAction::noop`]
    /// when it is malformed.
    #[must_use]
    pub fn sanitize(raw: &[f64]) -> Self {
        match Self::try_from_slice(raw) {
            Ok(action) => action,
            Err(err) => {
                tracing::debug!(%err, "malformed action replaced by no-op");
                Self::noop()
            }
        }
    }

    /// Movement component as a 2D vector
    #[must_use]
    pub fn movement(&self) -> [f64; 2] {
        [self.move_x, self.move_y]
    }

    /// Whether this action requests a split
    #[must_use]
    pub fn is_split(&self) -> bool {
        self.action_type == ActionType::Split
    }

    /// Convert action to its wire representation
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.move_x, self.move_y, self.action_type.code() as f64]
    }
}

impl From<AgentAction> for Vec<f64> {
    fn from(action: AgentAction) -> Self {
        action.to_vec()
    }
}
