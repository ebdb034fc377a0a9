use std::sync::atomic::{AtomicUsize, Ordering};

use crate::application::ports::{ClassifierError, VoiceClassifier};
use crate::domain::{InferenceResult, Waveform};

/// Classifier returning a canned result. Counts calls so tests can assert that
/// rejected requests never reach inference.
pub struct MockVoiceClassifier {
    outcome: Result<InferenceResult, String>,
    calls: AtomicUsize,
}

impl MockVoiceClassifier {
    pub fn returning(label_index: usize, label_name: &str, probability: f32) -> Self {
        Self {
            outcome: Ok(InferenceResult::new(label_index, label_name, probability)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl VoiceClassifier for MockVoiceClassifier {
    fn classify(&self, waveform: &Waveform) -> Result<InferenceResult, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if waveform.is_empty() {
            return Err(ClassifierError::InvalidInput("empty waveform".to_string()));
        }
        self.outcome
            .clone()
            .map_err(ClassifierError::InferenceFailed)
    }

    fn model_id(&self) -> &str {
        "mock"
    }
}
