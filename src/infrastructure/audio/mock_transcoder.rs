use std::sync::atomic::{AtomicUsize, Ordering};

use crate::application::ports::{AudioTranscoder, AudioTranscoderError};

/// Transcoder that always fails, forcing the passthrough path.
#[derive(Debug, Default)]
pub struct MockFailingTranscoder {
    calls: AtomicUsize,
}

impl MockFailingTranscoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AudioTranscoder for MockFailingTranscoder {
    fn transcode(&self, _data: &[u8]) -> Result<Vec<u8>, AudioTranscoderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AudioTranscoderError::TranscodingFailed(
            "mock transcoder failure".to_string(),
        ))
    }
}
