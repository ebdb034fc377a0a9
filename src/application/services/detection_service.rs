use std::borrow::Cow;
use std::sync::Arc;

use crate::application::ports::{
    AudioDecoder, AudioDecoderError, AudioTranscoder, ClassifierError, VoiceClassifier,
};
use crate::domain::{LabelPolicy, Verdict, Waveform};

use super::audio_payload::{AudioPayloadError, decode_base64_audio};

/// Runs the full analysis pipeline for one clip:
/// base64 → container bytes → WAV (best effort) → waveform → classifier → verdict.
pub struct DetectionService {
    transcoder: Arc<dyn AudioTranscoder>,
    decoder: Arc<dyn AudioDecoder>,
    classifier: Arc<dyn VoiceClassifier>,
    label_policy: LabelPolicy,
    min_samples: usize,
}

impl DetectionService {
    pub fn new(
        transcoder: Arc<dyn AudioTranscoder>,
        decoder: Arc<dyn AudioDecoder>,
        classifier: Arc<dyn VoiceClassifier>,
        label_policy: LabelPolicy,
        min_samples: usize,
    ) -> Self {
        Self {
            transcoder,
            decoder,
            classifier,
            label_policy,
            min_samples,
        }
    }

    pub fn model_id(&self) -> &str {
        self.classifier.model_id()
    }

    /// Analyzes a base64-encoded clip. Blocking and compute bound; call it from
    /// a blocking-capable thread.
    pub fn analyze(&self, audio_base64: &str) -> Result<Verdict, DetectionError> {
        let compressed = decode_base64_audio(audio_base64)?;
        tracing::debug!(bytes = compressed.len(), "Audio payload decoded");

        let container = self.normalize_format(&compressed);
        let waveform = self.preprocess(&container)?;

        let inference = self.classifier.classify(&waveform)?;
        let verdict = self.label_policy.verdict(&inference);

        tracing::info!(
            model = self.classifier.model_id(),
            label_index = inference.label_index,
            label_name = %inference.label_name,
            probability = inference.probability,
            classification = %verdict.classification,
            "Voice analysis completed"
        );

        Ok(verdict)
    }

    /// Falls back to the original bytes when transcoding fails; the decoder
    /// probes the container format itself.
    fn normalize_format<'a>(&self, compressed: &'a [u8]) -> Cow<'a, [u8]> {
        match self.transcoder.transcode(compressed) {
            Ok(wav) => Cow::Owned(wav),
            Err(e) => {
                tracing::warn!(error = %e, "Transcoding failed, passing original bytes through");
                Cow::Borrowed(compressed)
            }
        }
    }

    pub fn preprocess(&self, container: &[u8]) -> Result<Waveform, DetectionError> {
        let waveform = self.decoder.decode(container)?;
        let original_len = waveform.len();

        let waveform = waveform.pad_to(self.min_samples).peak_normalize();

        tracing::debug!(
            original_samples = original_len,
            samples = waveform.len(),
            sample_rate = waveform.sample_rate(),
            "Waveform preprocessed"
        );

        Ok(waveform)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("payload: {0}")]
    Payload(#[from] AudioPayloadError),
    #[error("decode: {0}")]
    Decoding(#[from] AudioDecoderError),
    #[error("classifier: {0}")]
    Classification(#[from] ClassifierError),
}
