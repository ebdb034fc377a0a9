use super::classification::Classification;
use super::inference_result::InferenceResult;
use super::verdict::Verdict;

const DEFAULT_AI_PATTERNS: [&str; 3] = ["fake", "spoof", "ai"];
const DEFAULT_HUMAN_PATTERNS: [&str; 3] = ["real", "bonafide", "human"];

/// Maps a label-name substring to a polarity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRule {
    pub pattern: String,
    pub classification: Classification,
}

impl LabelRule {
    pub fn new(pattern: impl Into<String>, classification: Classification) -> Self {
        Self {
            pattern: pattern.into().to_lowercase(),
            classification,
        }
    }

    fn matches(&self, label_name: &str) -> bool {
        !self.pattern.is_empty() && label_name.contains(&self.pattern)
    }
}

/// Decides polarity from the label index alone when no rule matches the label name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionalFallback {
    pub ai_index: usize,
}

impl PositionalFallback {
    pub fn classify(&self, label_index: usize) -> Classification {
        if label_index == self.ai_index {
            Classification::AiGenerated
        } else {
            Classification::Human
        }
    }
}

impl Default for PositionalFallback {
    fn default() -> Self {
        Self { ai_index: 1 }
    }
}

/// Turns model label vocabulary into the stable AI_GENERATED / HUMAN contract.
///
/// Rules are evaluated in order against the lower-cased label name and the first
/// match wins. When none match, the positional fallback decides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPolicy {
    rules: Vec<LabelRule>,
    fallback: PositionalFallback,
}

impl LabelPolicy {
    pub fn new(rules: Vec<LabelRule>, fallback: PositionalFallback) -> Self {
        Self { rules, fallback }
    }

    /// Builds the rule list with every AI pattern ahead of every human pattern.
    pub fn from_patterns<A, H>(ai_patterns: A, human_patterns: H, fallback: PositionalFallback) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        H: IntoIterator,
        H::Item: Into<String>,
    {
        let rules = ai_patterns
            .into_iter()
            .map(|p| LabelRule::new(p, Classification::AiGenerated))
            .chain(
                human_patterns
                    .into_iter()
                    .map(|p| LabelRule::new(p, Classification::Human)),
            )
            .collect();
        Self::new(rules, fallback)
    }

    pub fn rules(&self) -> &[LabelRule] {
        &self.rules
    }

    pub fn classify(&self, label_index: usize, label_name: &str) -> Classification {
        let label_name = label_name.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&label_name))
            .map(|rule| rule.classification)
            .unwrap_or_else(|| self.fallback.classify(label_index))
    }

    pub fn verdict(&self, inference: &InferenceResult) -> Verdict {
        let classification = self.classify(inference.label_index, &inference.label_name);
        Verdict::new(classification, inference.probability)
    }
}

impl Default for LabelPolicy {
    fn default() -> Self {
        Self::from_patterns(
            DEFAULT_AI_PATTERNS,
            DEFAULT_HUMAN_PATTERNS,
            PositionalFallback::default(),
        )
    }
}
