use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::error::TrackletError;
use crate::router::InstallState;

/// Refuses every installer request once the installation artifact exists.
/// Runs before any other extractor so nothing is read or written.
#[derive(Debug, Clone, Copy)]
pub struct RequireFreshInstall;

impl FromRequestParts<InstallState> for RequireFreshInstall {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &InstallState,
    ) -> Result<Self, Self::Rejection> {
        if state.config.install.is_installed() {
            warn!(
                path = %parts.uri.path(),
                artifact = %state.config.install.artifact_file().display(),
                "installer request refused: already installed"
            );
            return Err(TrackletError::AlreadyInstalled.into_response());
        }
        Ok(Self)
    }
}
