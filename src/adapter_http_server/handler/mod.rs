use std::borrow::Cow;

use axum::response::IntoResponse;
use axum::routing::get;

use crate::adapter_http_server::ServerState;

mod download;
mod health;
mod latest_release;

pub fn build<RR>() -> axum::Router<ServerState<RR>>
where
    RR: crate::domain::prelude::ReleaseResolver + Clone,
{
    axum::Router::new()
        .route("/api/latest-release", get(latest_release::handler::<RR>))
        .route("/download/{platform}", get(download::handler::<RR>))
        .route("/health", get(health::handler))
}

#[derive(Debug)]
struct ApiError {
    status_code: axum::http::StatusCode,
    message: Cow<'static, str>,
}

impl ApiError {
    #[inline]
    fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            status_code: axum::http::StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    #[inline]
    fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            status_code: axum::http::StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code, self.message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::prelude::MockReleaseResolverService;

    /// Catches invalid route patterns at test time rather than at startup.
    #[test]
    fn should_build_router_without_panicking() {
        let _router = super::build::<MockReleaseResolverService>();
    }
}
