use crate::domain::{InferenceResult, Waveform};

/// Pretrained two-class speech classifier. Implementations are loaded once and
/// shared read-only between requests.
pub trait VoiceClassifier: Send + Sync {
    fn classify(&self, waveform: &Waveform) -> Result<InferenceResult, ClassifierError>;

    fn model_id(&self) -> &str;
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("model loading failed: {0}")]
    ModelLoadFailed(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
}
