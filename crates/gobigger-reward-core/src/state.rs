//! Per-tick agent state produced by the arena engine

use serde::{Deserialize, Serialize};

/// A point in the continuous arena
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Position {
    /// Create a new position, rejecting non-finite coordinates
    #[must_use]
    pub fn new(x: f64, y: f64) -> Option<Self> {
        (x.is_finite() && y.is_finite()).then_some(Self { x, y })
    }

    /// Centre of an axis-aligned `[x0, y0, x1, y1]` rectangle
    #[must_use]
    pub fn from_rectangle(rect: [f64; 4]) -> Option<Self> {
        Self::new((rect[0] + rect[2]) / 2.0, (rect[1] + rect[3]) / 2.0)
    }
}

/// An opponent inside the agent's field of view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentSnapshot {
    /// Opponent player identifier
    pub id: String,
    /// Number of the opponent's clone balls still alive
    pub cell_count: u32,
}

/// Agent state for one simulation tick.
///
/// Deserialization is lenient: every field is optional and the position may
/// be given either as `position` or as a bounding `rectangle`. Whatever is
/// missing is resolved here, once, so downstream code only deals with
/// typed, explicit options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawAgentState")]
pub struct AgentState {
    /// Centre of the agent, `None` when unavailable
    pub position: Option<Position>,
    /// Current score (mass)
    pub score: f64,
    /// Number of clone balls
    pub cell_count: u32,
    /// Food items inside the field of view
    pub visible_food_count: u32,
    /// Opponents inside the field of view
    pub visible_opponents: Vec<OpponentSnapshot>,
    /// Opponents reported as eaten by this agent during the tick
    pub eaten_opponents: Vec<String>,
    /// Whether the agent is alive
    pub alive: bool,
}

impl AgentState {
    /// A live agent at `(x, y)` with one cell and no visible entities
    #[must_use]
    pub fn at(x: f64, y: f64, score: f64) -> Self {
        Self {
            position: Position::new(x, y),
            score: if score.is_finite() { score } else { 0.0 },
            cell_count: 1,
            visible_food_count: 0,
            visible_opponents: Vec::new(),
            eaten_opponents: Vec::new(),
            alive: true,
        }
    }

    /// Set the number of visible food items
    #[must_use]
    pub fn with_food(mut self, count: u32) -> Self {
        self.visible_food_count = count;
        self
    }

    /// Set the number of clone balls
    #[must_use]
    pub fn with_cells(mut self, count: u32) -> Self {
        self.cell_count = count;
        self
    }

    /// Set the visible opponents
    #[must_use]
    pub fn with_opponents(mut self, opponents: Vec<OpponentSnapshot>) -> Self {
        self.visible_opponents = opponents;
        self
    }

    /// A state that carries no usable information: the agent is dead.
    #[must_use]
    pub fn dead() -> Self {
        Self {
            position: None,
            score: 0.0,
            cell_count: 0,
            visible_food_count: 0,
            visible_opponents: Vec::new(),
            eaten_opponents: Vec::new(),
            alive: false,
        }
    }

    /// An agent counts as dead when flagged so or when it has no position.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        !self.alive || self.position.is_none()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPosition {
    Pair([f64; 2]),
    Point { x: f64, y: f64 },
}

#[derive(Deserialize)]
#[serde(default)]
struct RawAgentState {
    position: Option<RawPosition>,
    rectangle: Option<[f64; 4]>,
    score: Option<f64>,
    cell_count: Option<u32>,
    visible_food_count: u32,
    visible_opponents: Vec<OpponentSnapshot>,
    eaten_opponents: Vec<String>,
    alive: Option<bool>,
}

impl Default for RawAgentState {
    fn default() -> Self {
        Self {
            position: None,
            rectangle: None,
            score: None,
            cell_count: None,
            visible_food_count: 0,
            visible_opponents: Vec::new(),
            eaten_opponents: Vec::new(),
            alive: None,
        }
    }
}

impl From<RawAgentState> for AgentState {
    fn from(raw: RawAgentState) -> Self {
        let position = match raw.position {
            Some(RawPosition::Pair([x, y]) | RawPosition::Point { x, y }) => Position::new(x, y),
            None => raw.rectangle.and_then(Position::from_rectangle),
        };
        let score = raw.score.filter(|s| s.is_finite()).unwrap_or(0.0);

        Self {
            position,
            score,
            cell_count: raw.cell_count.unwrap_or(1),
            visible_food_count: raw.visible_food_count,
            visible_opponents: raw.visible_opponents,
            eaten_opponents: raw.eaten_opponents,
            alive: raw.alive.unwrap_or(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rectangle_resolves_to_centre() {
        let state: AgentState = serde_json::from_value(json!({
            "rectangle": [90.0, 90.0, 110.0, 130.0],
            "score": 1200.0,
            "visible_food_count": 4
        }))
        .unwrap();

        assert_eq!(state.position, Position::new(100.0, 110.0));
        assert_eq!(state.cell_count, 1);
        assert_eq!(state.visible_food_count, 4);
        assert!(!state.is_dead());
    }

    #[test]
    fn test_missing_position_is_dead() {
        let state: AgentState = serde_json::from_value(json!({ "score": 10.0 })).unwrap();
        assert!(state.position.is_none());
        assert!(state.is_dead());
    }

    #[test]
    fn test_serialized_state_reads_back() {
        let state = AgentState::at(12.5, -3.0, 400.0)
            .with_cells(3)
            .with_opponents(vec![OpponentSnapshot { id: "p2".into(), cell_count: 2 }]);
        let text = serde_json::to_string(&state).unwrap();
        let back: AgentState = serde_json::from_str(&text).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_non_finite_input_is_dropped() {
        let state: AgentState = serde_json::from_value(json!({
            "position": [1.0, 2.0],
            "score": null,
            "alive": true
        }))
        .unwrap();
        assert_eq!(state.score, 0.0);
        assert!(Position::new(f64::INFINITY, 0.0).is_none());
    }
}
