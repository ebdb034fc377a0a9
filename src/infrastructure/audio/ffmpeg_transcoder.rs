use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::application::ports::{AudioTranscoder, AudioTranscoderError};

pub const DEFAULT_FFMPEG_BINARY: &str = "ffmpeg";

const INPUT_FORMAT: &str = "mp3";

/// Transcodes MP3 bytes to 16-bit PCM WAV by running an external ffmpeg process.
///
/// Input and output go through temporary files so that ffmpeg can seek and
/// write a complete RIFF header.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    binary: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new(DEFAULT_FFMPEG_BINARY)
    }
}

impl AudioTranscoder for FfmpegTranscoder {
    #[tracing::instrument(skip(self, data), fields(bytes = data.len()))]
    fn transcode(&self, data: &[u8]) -> Result<Vec<u8>, AudioTranscoderError> {
        if data.is_empty() {
            return Err(AudioTranscoderError::EmptyInput);
        }

        let mut input = tempfile::Builder::new()
            .suffix(".mp3")
            .tempfile()
            .map_err(|e| AudioTranscoderError::TranscodingFailed(format!("temp input: {e}")))?;
        input
            .write_all(data)
            .map_err(|e| AudioTranscoderError::TranscodingFailed(format!("write input: {e}")))?;
        input
            .flush()
            .map_err(|e| AudioTranscoderError::TranscodingFailed(format!("flush input: {e}")))?;

        let output = tempfile::Builder::new()
            .suffix(".wav")
            .tempfile()
            .map_err(|e| AudioTranscoderError::TranscodingFailed(format!("temp output: {e}")))?;

        let result = Command::new(&self.binary)
            .args(["-hide_banner", "-loglevel", "error", "-nostdin", "-y"])
            .args(["-f", INPUT_FORMAT, "-i"])
            .arg(input.path())
            .args(["-vn", "-acodec", "pcm_s16le", "-f", "wav"])
            .arg(output.path())
            .output()
            .map_err(|e| AudioTranscoderError::Unavailable(format!("{}: {e}", self.binary.display())))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(AudioTranscoderError::TranscodingFailed(format!(
                "ffmpeg exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }

        let wav = std::fs::read(output.path())
            .map_err(|e| AudioTranscoderError::TranscodingFailed(format!("read output: {e}")))?;
        if wav.is_empty() {
            return Err(AudioTranscoderError::TranscodingFailed(
                "ffmpeg produced no output".to_string(),
            ));
        }

        tracing::debug!(wav_bytes = wav.len(), "Audio transcoded to WAV");

        Ok(wav)
    }
}

/// Verifies that the ffmpeg binary can be executed.
pub fn check_ffmpeg_binary(binary: &Path) -> Result<(), AudioTranscoderError> {
    let output = Command::new(binary)
        .arg("-version")
        .output()
        .map_err(|e| AudioTranscoderError::Unavailable(format!("{}: {e}", binary.display())))?;

    if output.status.success() {
        Ok(())
    } else {
        Err(AudioTranscoderError::Unavailable(format!(
            "{} -version exited with {}",
            binary.display(),
            output.status
        )))
    }
}
