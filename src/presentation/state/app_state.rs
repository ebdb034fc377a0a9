use std::sync::Arc;

use crate::application::services::DetectionService;

/// Shared, read-only handler state. Cloned per request; every field is a
/// cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub detection_service: Arc<DetectionService>,
    pub api_key: Arc<str>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(
        detection_service: Arc<DetectionService>,
        api_key: impl Into<Arc<str>>,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            detection_service,
            api_key: api_key.into(),
            max_body_bytes,
        }
    }
}
