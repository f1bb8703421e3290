//! Team rank rewards and opponent elimination tracking

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use gobigger_reward_core::{OpponentSnapshot, RewardConfig};

/// Team identifier
pub type TeamId = u32;

/// A team's standing among all teams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRankSnapshot {
    /// Team being ranked
    pub team_id: TeamId,
    /// 1-based rank, 1 is best
    pub rank: u32,
    /// Number of competing teams
    pub total_teams: u32,
}

impl TeamRankSnapshot {
    /// Clamp into a well-formed snapshot: at least one team, rank within `1..=total`.
    #[must_use]
    pub fn normalized(self) -> Self {
        let total_teams = self.total_teams.max(1);
        Self {
            team_id: self.team_id,
            rank: self.rank.clamp(1, total_teams),
            total_teams,
        }
    }
}

/// Per-team rank evaluator
#[derive(Debug, Clone)]
pub struct TeamRankEvaluator {
    rank_weight: f64,
    promotion_bonus: f64,
    demotion_penalty: f64,
    opponent_eaten_bonus: f64,
    last_rank: Option<u32>,
}

impl TeamRankEvaluator {
    /// Create an evaluator with no rank observed yet
    #[must_use]
    pub fn new(config: &RewardConfig) -> Self {
        Self {
            rank_weight: config.rank_weight,
            promotion_bonus: config.rank_promotion_bonus,
            demotion_penalty: config.rank_demotion_penalty,
            opponent_eaten_bonus: config.opponent_eaten_bonus,
            last_rank: None,
        }
    }

    /// Rank-change term relative to the previous observation, then remember `rank`.
    fn rank_change(&mut self, rank: u32) -> f64 {
        let change = match self.last_rank {
            Some(last) if rank < last => self.promotion_bonus,
            Some(last) if rank > last => self.demotion_penalty,
            _ => 0.0,
        };
        self.last_rank = Some(rank);
        change
    }

    /// Record an intermediate rank observation.
    pub fn observe_rank(&mut self, snapshot: TeamRankSnapshot) {
        self.last_rank = Some(snapshot.normalized().rank);
    }

    /// Terminal bonus: `(total - rank + 1) / total * weight` plus the
    /// promotion or demotion term.
    pub fn on_episode_end(&mut self, snapshot: TeamRankSnapshot) -> f64 {
        let snapshot = snapshot.normalized();
        let standing = f64::from(snapshot.total_teams - snapshot.rank + 1)
            / f64::from(snapshot.total_teams);
        let bonus = standing * self.rank_weight + self.rank_change(snapshot.rank);
        tracing::debug!(
            team = snapshot.team_id,
            rank = snapshot.rank,
            total = snapshot.total_teams,
            bonus,
            "team rank evaluated"
        );
        bonus
    }

    /// Fixed bonus per eliminated opponent
    #[must_use]
    pub fn on_opponent_eaten(&self, count: u32) -> f64 {
        f64::from(count) * self.opponent_eaten_bonus
    }

    /// Most recently observed rank
    #[must_use]
    pub fn last_rank(&self) -> Option<u32> {
        self.last_rank
    }
}

/// Remembers opponents' cell counts to detect eliminations.
#[derive(Debug, Clone, Default)]
pub struct OpponentWatch {
    cells: HashMap<String, u32>,
}

impl OpponentWatch {
    /// Create an empty watch
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record visible opponents and return how many were eliminated since
    /// the previous observation.
    ///
    /// An opponent counts when its cell count went from `> 0` to `0`, or
    /// when it appears in `reported`. Each opponent counts at most once per
    /// call.
    pub fn observe(&mut self, visible: &[OpponentSnapshot], reported: &[String]) -> u32 {
        let mut eliminated: BTreeSet<&str> = reported.iter().map(String::as_str).collect();
        for opponent in visible {
            let previous = self.cells.insert(opponent.id.clone(), opponent.cell_count);
            if opponent.cell_count == 0 && previous.is_some_and(|cells| cells > 0) {
                eliminated.insert(opponent.id.as_str());
            }
        }
        u32::try_from(eliminated.len()).unwrap_or(u32::MAX)
    }
}
