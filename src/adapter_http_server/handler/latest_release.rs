use axum::Json;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::adapter_http_server::ServerState;
use crate::adapter_http_server::handler::ApiError;
use crate::domain::entity::Platform;

#[derive(Debug, Default, serde::Deserialize)]
pub struct QueryParams {
    platform: Option<String>,
}

/// Serves the latest release as JSON.
///
/// Answers 200 whether the release was resolved live or taken from the fallback,
/// so the website always has something to render.
pub async fn handler<RR>(
    State(state): State<ServerState<RR>>,
    Query(params): Query<QueryParams>,
) -> Result<Response, ApiError>
where
    RR: crate::domain::prelude::ReleaseResolver + Clone,
{
    let platform = crate::non_empty(params.platform)
        .as_deref()
        .map(str::parse::<Platform>)
        .transpose()
        .map_err(|err| ApiError::bad_request(err.to_string()))?;
    let info = state
        .release_resolver
        .resolve_latest_release(platform)
        .await;
    if info.error.is_some() {
        tracing::debug!(version = %info.version, "serving fallback release");
    }
    let mut res = Json(info).into_response();
    if let Some(value) = state.cache.header_value() {
        res.headers_mut().insert(header::CACHE_CONTROL, value);
    }
    Ok(res)
}
