use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};

use crate::domain::{AudioFormat, Classification, ConfidenceScore, Language, Verdict};
use crate::presentation::error::ApiError;
use crate::presentation::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionRequest {
    pub language: String,
    pub audio_format: String,
    pub audio_base64: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DetectionResponse {
    #[serde(rename_all = "camelCase")]
    Success {
        language: Language,
        classification: Classification,
        confidence_score: ConfidenceScore,
        explanation: &'static str,
    },
    Error {
        message: String,
    },
}

impl DetectionResponse {
    pub fn success(language: Language, verdict: Verdict) -> Self {
        DetectionResponse::Success {
            language,
            classification: verdict.classification,
            confidence_score: verdict.confidence,
            explanation: verdict.explanation,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        DetectionResponse::Error {
            message: message.into(),
        }
    }
}

/// `POST /api/voice-detection`. Authentication has already happened in the
/// route layer; analysis failures are reported in a 200 body.
#[tracing::instrument(skip(state, payload))]
pub async fn voice_detection_handler(
    State(state): State<AppState>,
    payload: Result<Json<DetectionRequest>, JsonRejection>,
) -> Result<Json<DetectionResponse>, ApiError> {
    let Json(request) = payload?;

    let language: Language = request
        .language
        .parse()
        .map_err(ApiError::UnsupportedLanguage)?;
    let _format: AudioFormat = request
        .audio_format
        .parse()
        .map_err(ApiError::UnsupportedFormat)?;

    tracing::debug!(
        language = %language,
        payload_chars = request.audio_base64.len(),
        "Voice detection request accepted"
    );

    let service = Arc::clone(&state.detection_service);
    let audio_base64 = request.audio_base64;
    let span = tracing::Span::current();

    let outcome =
        tokio::task::spawn_blocking(move || span.in_scope(|| service.analyze(&audio_base64)))
            .await;

    let response = match outcome {
        Ok(Ok(verdict)) => DetectionResponse::success(language, verdict),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Voice analysis failed");
            DetectionResponse::error(e.to_string())
        }
        Err(e) => {
            tracing::error!(error = %e, "Voice analysis task did not complete");
            DetectionResponse::error("Voice analysis aborted unexpectedly")
        }
    };

    Ok(Json(response))
}
