use crate::application::ports::{AudioTranscoder, AudioTranscoderError};

/// Hands the original bytes straight to the decoder. Used when transcoding is
/// disabled or no ffmpeg binary is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTranscoder;

impl AudioTranscoder for PassthroughTranscoder {
    fn transcode(&self, data: &[u8]) -> Result<Vec<u8>, AudioTranscoderError> {
        if data.is_empty() {
            return Err(AudioTranscoderError::EmptyInput);
        }
        Ok(data.to_vec())
    }
}
