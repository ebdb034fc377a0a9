mod audio_decoder;
mod audio_transcoder;
mod voice_classifier;

pub use audio_decoder::{AudioDecoder, AudioDecoderError};
pub use audio_transcoder::{AudioTranscoder, AudioTranscoderError};
pub use voice_classifier::{ClassifierError, VoiceClassifier};
