//! Bounded food-gathering efficiency

/// Maps positive score growth to a capped efficiency bonus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FoodEfficiencyEstimator;

impl FoodEfficiencyEstimator {
    /// `min(delta / 100, 2)` for positive finite deltas, otherwise `0`
    #[must_use]
    pub fn estimate(self, score_delta: f64) -> f64 {
        if score_delta.is_finite() && score_delta > 0.0 {
            (score_delta / 100.0).min(2.0)
        } else {
            0.0
        }
    }
}
