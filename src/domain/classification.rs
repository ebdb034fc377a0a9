use std::fmt;

use serde::Serialize;

const AI_GENERATED_EXPLANATION: &str =
    "Deep learning model detected synthetic vocal artifacts and unnatural spectral patterns.";
const HUMAN_EXPLANATION: &str =
    "Deep learning model verified natural micro-prosody and human vocal characteristics.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    AiGenerated,
    Human,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::AiGenerated => "AI_GENERATED",
            Classification::Human => "HUMAN",
        }
    }

    /// Fixed sentence returned alongside the verdict.
    pub fn explanation(&self) -> &'static str {
        match self {
            Classification::AiGenerated => AI_GENERATED_EXPLANATION,
            Classification::Human => HUMAN_EXPLANATION,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
