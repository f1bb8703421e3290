//! Split classification and split/eat event correlation
//!
//! A split is judged twice. Immediately, against local heuristics (food in
//! view, time since the previous split, affordability, fragmentation). Then,
//! after the fact, by whether the agent actually ate something within the
//! efficiency window. Pending splits and eats live in two bounded FIFO
//! queues; every tick sweeps the head of the split queue, so each split is
//! resolved exactly once: matched, expired, or evicted on overflow.

use crate::buffer::RingBuffer;

const FOOD_SHORTAGE_PENALTY: f64 = 0.5;
const TOO_FREQUENT_PENALTY: f64 = 0.3;
const OVER_FRAGMENTED_PENALTY: f64 = 0.4;

/// Thresholds a split must meet to count as smart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitPolicy {
    /// Minimum visible food
    pub food_threshold: u32,
    /// Minimum steps since the previous split
    pub interval_threshold: u64,
    /// Minimum score
    pub score_threshold: f64,
    /// Maximum clone balls
    pub max_cells: u32,
    /// Steps after a split during which eating is attributed to it
    pub efficiency_window: u64,
    /// Pending split events kept
    pub split_capacity: usize,
    /// Pending eat events kept
    pub eat_capacity: usize,
}

impl Default for SplitPolicy {
    fn default() -> Self {
        Self {
            food_threshold: 3,
            interval_threshold: 30,
            score_threshold: 2000.0,
            max_cells: 8,
            efficiency_window: 50,
            split_capacity: 5,
            eat_capacity: 20,
        }
    }
}

/// A split awaiting correlation
#[derive(Debug, Clone, PartialEq)]
pub struct SplitEvent {
    /// Step of the split
    pub step: u64,
    /// Score when the split was requested
    pub score_before_split: f64,
    /// Clone balls when the split was requested
    pub cell_count_before_split: u32,
}

/// Evidence of eating, by score growth or an explicit opponent kill
#[derive(Debug, Clone, PartialEq)]
pub struct EatEvent {
    /// Step of the eat
    pub step: u64,
    /// Opponents eaten, empty for plain score growth
    pub opponents: Vec<String>,
}

/// Immediate verdict on a split action
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SplitVerdict {
    /// Bonus for a smart split
    pub smart_bonus: f64,
    /// Penalty magnitude for a wasteful split
    pub waste_penalty: f64,
}

/// Deferred outcome of the per-tick correlation sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Correlation {
    /// Splits that were followed by eating (at most one per tick)
    pub matched: u32,
    /// Splits whose window closed without eating
    pub expired: u32,
    /// Opponents named by the eats credited to the matched split
    pub opponents: u32,
}

/// Running split counters for one episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SplitCounters {
    /// Splits requested
    pub total: u64,
    /// Splits classified smart
    pub smart: u64,
    /// Splits classified wasteful
    pub wasted: u64,
    /// Splits later matched to eating
    pub correlated: u64,
    /// Splits that expired unmatched
    pub expired: u64,
    /// Splits dropped from a full queue before resolution
    pub evicted: u64,
}

/// Per-agent split and eat bookkeeping
#[derive(Debug, Clone)]
pub struct SplitEventCorrelator {
    policy: SplitPolicy,
    pending_splits: RingBuffer<SplitEvent>,
    pending_eats: RingBuffer<EatEvent>,
    last_split_step: Option<u64>,
    counters: SplitCounters,
}

impl SplitEventCorrelator {
    /// Create a correlator with empty queues
    #[must_use]
    pub fn new(policy: SplitPolicy) -> Self {
        Self {
            pending_splits: RingBuffer::new(policy.split_capacity),
            pending_eats: RingBuffer::new(policy.eat_capacity),
            policy,
            last_split_step: None,
            counters: SplitCounters::default(),
        }
    }

    /// Steps since the previous split; the first split of an episode
    /// behaves as if one happened just before step 0.
    #[must_use]
    pub fn steps_since_last_split(&self, step: u64) -> u64 {
        match self.last_split_step {
            Some(last) => step.saturating_sub(last),
            None => step.saturating_add(1),
        }
    }

    /// Classify an action and, if it is a split, enqueue it.
    pub fn on_action(
        &mut self,
        is_split: bool,
        step: u64,
        food_nearby: u32,
        score: f64,
        cell_count: u32,
    ) -> SplitVerdict {
        if !is_split {
            return SplitVerdict::default();
        }

        let since = self.steps_since_last_split(step);
        let enough_food = food_nearby >= self.policy.food_threshold;
        let well_timed = since >= self.policy.interval_threshold;
        let affordable = score >= self.policy.score_threshold;
        let not_fragmented = cell_count <= self.policy.max_cells;

        let verdict = if enough_food && well_timed && affordable && not_fragmented {
            self.counters.smart += 1;
            #[allow(clippy::cast_precision_loss)]
            let timing = since as f64 / 100.0;
            SplitVerdict {
                smart_bonus: 1.0 + (f64::from(food_nearby) / 10.0).min(1.0) + timing.min(0.5),
                waste_penalty: 0.0,
            }
        } else {
            self.counters.wasted += 1;
            let waste_penalty = [
                (!enough_food, FOOD_SHORTAGE_PENALTY),
                (!well_timed, TOO_FREQUENT_PENALTY),
                (!not_fragmented, OVER_FRAGMENTED_PENALTY),
            ]
            .iter()
            .filter(|(violated, _)| *violated)
            .map(|(_, penalty)| penalty)
            .sum();
            SplitVerdict {
                smart_bonus: 0.0,
                waste_penalty,
            }
        };

        tracing::debug!(
            step,
            food_nearby,
            since,
            score,
            cell_count,
            smart = verdict.smart_bonus > 0.0,
            "split classified"
        );

        self.counters.total += 1;
        self.last_split_step = Some(step);
        let evicted = self.pending_splits.push(SplitEvent {
            step,
            score_before_split: score,
            cell_count_before_split: cell_count,
        });
        if let Some(event) = evicted {
            self.counters.evicted += 1;
            tracing::trace!(split_step = event.step, "pending split evicted unresolved");
        }

        verdict
    }

    /// Register score growth observed at `step` as a potential eat.
    pub fn on_score_growth(&mut self, step: u64) {
        self.on_eat(step, Vec::new());
    }

    /// Register an eat event, optionally naming eaten opponents.
    pub fn on_eat(&mut self, step: u64, opponents: Vec<String>) {
        self.pending_eats.push(EatEvent { step, opponents });
    }

    /// Resolve the head of the split queue against pending eats.
    ///
    /// Expired heads are drained first; then the oldest still-open split is
    /// matched if an eat happened after it, consuming that split and every
    /// eat attributed to it.
    pub fn correlate(&mut self, step: u64) -> Correlation {
        let window = self.policy.efficiency_window.max(1);
        let mut outcome = Correlation::default();

        loop {
            let Some(head) = self.pending_splits.front() else {
                break;
            };
            let split_step = head.step;
            let age = step.saturating_sub(split_step);

            if age >= window {
                if let Some(split) = self.pending_splits.pop_front() {
                    tracing::debug!(
                        split_step,
                        step,
                        score = split.score_before_split,
                        cells = split.cell_count_before_split,
                        "split expired without eating"
                    );
                }
                outcome.expired += 1;
                self.counters.expired += 1;
                metrics::increment_counter!("gobigger_reward.splits.expired");
                continue;
            }

            // eats at or before the oldest open split can never be attributed
            self.pending_eats.drain_front_while(|eat| eat.step <= split_step);

            if age > 1 && !self.pending_eats.is_empty() {
                let opponents: usize =
                    self.pending_eats.iter().map(|eat| eat.opponents.len()).sum();
                self.pending_eats.clear();
                if let Some(split) = self.pending_splits.pop_front() {
                    tracing::debug!(
                        split_step,
                        step,
                        score = split.score_before_split,
                        cells = split.cell_count_before_split,
                        opponents,
                        "split correlated with eating"
                    );
                }
                outcome.matched += 1;
                outcome.opponents = u32::try_from(opponents).unwrap_or(u32::MAX);
                self.counters.correlated += 1;
                metrics::increment_counter!("gobigger_reward.splits.correlated");
            }
            break;
        }

        outcome
    }

    /// Oldest split still awaiting resolution
    #[must_use]
    pub fn oldest_pending(&self) -> Option<&SplitEvent> {
        self.pending_splits.front()
    }

    /// Splits still awaiting resolution
    #[must_use]
    pub fn pending_splits(&self) -> usize {
        self.pending_splits.len()
    }

    /// Eats still available for attribution
    #[must_use]
    pub fn pending_eats(&self) -> usize {
        self.pending_eats.len()
    }

    /// Episode counters
    #[must_use]
    pub fn counters(&self) -> SplitCounters {
        self.counters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn correlator() -> SplitEventCorrelator {
        SplitEventCorrelator::new(SplitPolicy::default())
    }

    #[test]
    fn test_smart_split_bonus() {
        let mut c = correlator();
        c.on_action(true, 10, 0, 0.0, 1);
        let verdict = c.on_action(true, 50, 5, 2500.0, 4);
        assert_abs_diff_eq!(verdict.smart_bonus, 1.9, epsilon = 1e-12);
        assert_abs_diff_eq!(verdict.waste_penalty, 0.0);
        assert_eq!(c.counters().smart, 1);
    }

    #[test]
    fn test_food_and_timing_failures_add_up() {
        let mut c = correlator();
        c.on_action(true, 5, 10, 5000.0, 1);
        let verdict = c.on_action(true, 10, 1, 5000.0, 2);
        assert_abs_diff_eq!(verdict.waste_penalty, 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(verdict.smart_bonus, 0.0);
    }

    #[test]
    fn test_unaffordable_split_has_no_sub_penalty() {
        let mut c = correlator();
        let verdict = c.on_action(true, 100, 10, 10.0, 1);
        assert_abs_diff_eq!(verdict.smart_bonus, 0.0);
        assert_abs_diff_eq!(verdict.waste_penalty, 0.0);
        assert_eq!(c.counters().wasted, 1);
    }

    #[test]
    fn test_over_fragmented_penalty() {
        let mut c = correlator();
        let verdict = c.on_action(true, 100, 10, 5000.0, 9);
        assert_abs_diff_eq!(verdict.waste_penalty, 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_first_split_counts_from_before_step_zero() {
        let c = correlator();
        assert_eq!(c.steps_since_last_split(29), 30);
    }

    #[test]
    fn test_non_split_is_ignored() {
        let mut c = correlator();
        assert_eq!(c.on_action(false, 3, 10, 9000.0, 1), SplitVerdict::default());
        assert_eq!(c.pending_splits(), 0);
        assert_eq!(c.counters().total, 0);
    }

    #[test]
    fn test_split_matches_later_eat_once() {
        let mut c = correlator();
        c.on_action(true, 10, 0, 0.0, 1);
        c.on_score_growth(11);
        // age 1 is too young to attribute
        assert_eq!(c.correlate(11), Correlation::default());

        c.on_score_growth(12);
        assert_eq!(c.correlate(12), Correlation { matched: 1, expired: 0, opponents: 0 });
        assert_eq!(c.pending_splits(), 0);
        assert_eq!(c.pending_eats(), 0);

        c.on_score_growth(13);
        assert_eq!(c.correlate(13), Correlation::default());
        assert_eq!(c.counters().correlated, 1);
    }

    #[test]
    fn test_eats_before_split_are_not_attributed() {
        let mut c = correlator();
        c.on_score_growth(3);
        c.on_action(true, 5, 0, 0.0, 1);
        assert_eq!(c.correlate(8), Correlation::default());
        assert_eq!(c.pending_eats(), 0);
        assert_eq!(c.pending_splits(), 1);
    }

    #[test]
    fn test_unmatched_split_expires_once() {
        let mut c = correlator();
        c.on_action(true, 0, 0, 0.0, 1);
        for step in 1..50 {
            assert_eq!(c.correlate(step), Correlation::default(), "step {step}");
        }
        assert_eq!(c.correlate(50), Correlation { matched: 0, expired: 1, opponents: 0 });
        assert_eq!(c.correlate(51), Correlation::default());
        assert_eq!(c.counters().expired, 1);
    }

    #[test]
    fn test_two_splits_share_no_eat() {
        let mut c = correlator();
        c.on_action(true, 10, 0, 0.0, 1);
        c.on_action(true, 12, 0, 0.0, 2);
        c.on_score_growth(14);

        assert_eq!(c.correlate(14).matched, 1);
        // the eat at 14 was consumed by the split at 10
        assert_eq!(c.correlate(15).matched, 0);
        assert_eq!(c.pending_splits(), 1);

        c.on_score_growth(16);
        assert_eq!(c.correlate(16).matched, 1);
        assert_eq!(c.counters().correlated, 2);
    }

    #[test]
    fn test_match_reports_split_context_and_opponents() {
        let mut c = correlator();
        c.on_action(true, 10, 4, 2600.0, 3);
        let oldest = c.oldest_pending().unwrap();
        assert_abs_diff_eq!(oldest.score_before_split, 2600.0);
        assert_eq!(oldest.cell_count_before_split, 3);

        c.on_eat(12, vec!["red-1".to_string(), "red-2".to_string()]);
        c.on_score_growth(12);
        let outcome = c.correlate(12);
        assert_eq!(outcome.matched, 1);
        assert_eq!(outcome.opponents, 2);
        assert!(c.oldest_pending().is_none());
    }

    #[test]
    fn test_overflow_evicts_oldest_split() {
        let mut c = SplitEventCorrelator::new(SplitPolicy {
            split_capacity: 2,
            ..SplitPolicy::default()
        });
        for step in [1, 2, 3] {
            c.on_action(true, step, 0, 0.0, 1);
        }
        assert_eq!(c.pending_splits(), 2);
        assert_eq!(c.counters().evicted, 1);
        assert_eq!(c.counters().total, 3);
    }

    #[test]
    fn test_several_expiries_drain_in_one_sweep() {
        let mut c = SplitEventCorrelator::new(SplitPolicy {
            efficiency_window: 5,
            ..SplitPolicy::default()
        });
        c.on_action(true, 0, 0, 0.0, 1);
        c.on_action(true, 1, 0, 0.0, 1);
        c.on_action(true, 9, 0, 0.0, 1);
        assert_eq!(c.correlate(9), Correlation { matched: 0, expired: 2, opponents: 0 });
        assert_eq!(c.pending_splits(), 1);
    }
}
