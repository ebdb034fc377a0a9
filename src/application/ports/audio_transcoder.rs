/// Converts a compressed clip into an uncompressed WAV container.
pub trait AudioTranscoder: Send + Sync {
    fn transcode(&self, data: &[u8]) -> Result<Vec<u8>, AudioTranscoderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AudioTranscoderError {
    #[error("empty audio input")]
    EmptyInput,
    #[error("transcoder unavailable: {0}")]
    Unavailable(String),
    #[error("transcoding failed: {0}")]
    TranscodingFailed(String),
}
