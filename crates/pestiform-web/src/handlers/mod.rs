//! HTTP handlers for all web routes.

pub mod predict;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Failures of the server itself, as opposed to prediction failures,
/// which are reported to the user as an invalid compound.
#[derive(Debug, Error)]
pub enum WebError {
    #[error("template rendering failed: {0}")]
    Template(#[from] minijinja::Error),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        error!(error = %self, "Request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
    }
}

pub async fn health() -> &'static str {
    "ok"
}
