use axum::http::header;
use axum::response::IntoResponse;

const OPENAPI_SPEC: &str = include_str!("../../../openapi.json");

pub async fn openapi_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], OPENAPI_SPEC)
}
