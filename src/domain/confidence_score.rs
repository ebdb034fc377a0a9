use serde::Serialize;

/// Probability of the winning class, clamped to [0, 1] and rounded half-to-even
/// to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct ConfidenceScore(f64);

impl ConfidenceScore {
    pub fn new(probability: f32) -> Self {
        let probability = if probability.is_finite() {
            f64::from(probability).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self((probability * 100.0).round_ties_even() / 100.0)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}
