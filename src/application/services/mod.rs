mod audio_payload;
mod detection_service;

pub use audio_payload::{AudioPayloadError, decode_base64_audio};
pub use detection_service::{DetectionError, DetectionService};
