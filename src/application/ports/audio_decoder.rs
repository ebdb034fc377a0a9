use crate::domain::Waveform;

/// Loads an audio container into mono PCM at the decoder's target rate.
pub trait AudioDecoder: Send + Sync {
    fn decode(&self, data: &[u8]) -> Result<Waveform, AudioDecoderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AudioDecoderError {
    #[error("audio decoding failed: {0}")]
    DecodingFailed(String),
    #[error("resampling failed: {0}")]
    ResamplingFailed(String),
}
