use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

pub const UNAUTHORIZED_MESSAGE: &str = "Invalid API key or malformed request";

/// Body shared by every non-success answer of the API.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
        }
    }
}

/// Errors rejected at the transport level, before any audio is touched.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{}", UNAUTHORIZED_MESSAGE)]
    Unauthorized,
    #[error("{0}")]
    UnsupportedLanguage(String),
    #[error("{0}")]
    UnsupportedFormat(String),
    #[error("{message}")]
    MalformedRequest { status: StatusCode, message: String },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::UnsupportedLanguage(_) | ApiError::UnsupportedFormat(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::MalformedRequest { status, .. } => *status,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
