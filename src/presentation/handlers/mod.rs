mod health;
mod openapi;
mod voice_detection;

pub use health::health_handler;
pub use openapi::openapi_handler;
pub use voice_detection::{DetectionRequest, DetectionResponse, voice_detection_handler};
