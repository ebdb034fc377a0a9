use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::infrastructure::observability::mask_secret;
use crate::presentation::error::ApiError;
use crate::presentation::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Rejects the request with 401 unless `x-api-key` equals the configured key.
/// Runs before the body is extracted.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let check = match request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        Some(key) if constant_time_eq(key.as_bytes(), state.api_key.as_bytes()) => Ok(()),
        Some(key) => Err(Some(mask_secret(key))),
        None => Err(None),
    };

    match check {
        Ok(()) => next.run(request).await,
        Err(Some(presented)) => {
            tracing::warn!(presented = %presented, "Rejected request with wrong API key");
            ApiError::Unauthorized.into_response()
        }
        Err(None) => {
            tracing::warn!("Rejected request without API key");
            ApiError::Unauthorized.into_response()
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
