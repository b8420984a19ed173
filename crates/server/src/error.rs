//! Structured errors for the vellum server.
//!
//! Every failure leaves the server as a `{success: false, message}` envelope
//! with a status code derived from the error kind.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use vellum_core::{Envelope, Error};

/// Errors returned by content routes.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] Error),

    /// Neither the store nor the snapshot has content for the name.
    #[error("NOT_FOUND: no content for {0}")]
    NotFound(String),

    /// The upstream auth layer did not supply a caller identity.
    #[error("UNAUTHORIZED: caller identity required")]
    Unauthorized,

    /// The request body could not be read as JSON.
    #[error("INVALID_INPUT: {0}")]
    BadBody(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(Error::UnmappedName(_) | Error::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Core(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadBody(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Core(e) if e.is_configuration() => tracing::error!(error = %self, "content name not mapped"),
            _ if status.is_server_error() => tracing::warn!(error = %self, "request failed"),
            _ => tracing::debug!(error = %self, status = status.as_u16(), "request rejected"),
        }

        (status, Json(Envelope::fail(self.to_string()))).into_response()
    }
}
