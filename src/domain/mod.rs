mod audio_format;
mod classification;
mod confidence_score;
mod inference_result;
mod label_policy;
mod language;
mod verdict;
mod waveform;

pub use audio_format::AudioFormat;
pub use classification::Classification;
pub use confidence_score::ConfidenceScore;
pub use inference_result::InferenceResult;
pub use label_policy::{LabelPolicy, LabelRule, PositionalFallback};
pub use language::Language;
pub use verdict::Verdict;
pub use waveform::Waveform;
