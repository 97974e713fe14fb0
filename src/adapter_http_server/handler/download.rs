use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::adapter_http_server::ServerState;
use crate::domain::entity::Platform;

/// Redirects to the installer of the latest release for a platform.
///
/// Returns HTTP 302 (Found) pointing to the upstream download URL, or to the
/// release page when the release holds no installer for that platform.
pub async fn handler<RR>(
    State(state): State<ServerState<RR>>,
    Path(platform): Path<String>,
) -> Result<Response, super::ApiError>
where
    RR: crate::domain::prelude::ReleaseResolver + Clone,
{
    let platform = platform
        .parse::<Platform>()
        .map_err(|err| super::ApiError::not_found(err.to_string()))?;
    let info = state
        .release_resolver
        .resolve_latest_release(Some(platform))
        .await;
    let target = match info.download_url {
        Some(url) => url,
        None => state.release_resolver.release_page_url().to_owned(),
    };
    Ok((StatusCode::FOUND, [(header::LOCATION, target)]).into_response())
}
