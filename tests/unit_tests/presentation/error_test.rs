use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::Value;
use voice_detector::presentation::ApiError;

async fn render(error: ApiError) -> (StatusCode, Value) {
    let response = error.into_response();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn given_unauthorized_when_rendering_then_401_with_fixed_message() {
    let (status, json) = render(ApiError::Unauthorized).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["status"], "error");
    assert_eq!(json["message"], "Invalid API key or malformed request");
}

#[tokio::test]
async fn given_validation_errors_when_rendering_then_400_with_message() {
    let (status, json) =
        render(ApiError::UnsupportedLanguage("Language Xhosa not supported".to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Language Xhosa not supported");

    let (status, _) = render(ApiError::UnsupportedFormat("ogg".to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_malformed_request_when_rendering_then_keeps_rejection_status() {
    let (status, json) = render(ApiError::MalformedRequest {
        status: StatusCode::UNPROCESSABLE_ENTITY,
        message: "missing field `audioBase64`".to_string(),
    })
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["status"], "error");
}
