use axum::http::StatusCode;

/// Liveness check. The service has no dependency that can be unhealthy:
/// the upstream going away only degrades responses to the fallback.
pub async fn handler() -> StatusCode {
    StatusCode::OK
}
