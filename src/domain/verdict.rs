use super::classification::Classification;
use super::confidence_score::ConfidenceScore;

#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub classification: Classification,
    pub confidence: ConfidenceScore,
    pub explanation: &'static str,
}

impl Verdict {
    pub fn new(classification: Classification, probability: f32) -> Self {
        Self {
            classification,
            confidence: ConfidenceScore::new(probability),
            explanation: classification.explanation(),
        }
    }
}
