//! Error types for the relay API.
//!
//! [`ApiError`] unifies handler failure modes into a single enum that
//! renders as the same `{"success": false, "message": ...}` body the
//! lookup endpoint uses for its own failures, so clients only ever parse
//! one error shape.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use skywatch_tracker::LookupError;
use skywatch_types::LookupResponse;

use crate::pages::PageError;

/// Errors that can occur in the relay API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request has no valid session.
    #[error("authentication required")]
    Unauthorized,

    /// The request body or parameters were malformed.
    #[error("{0}")]
    BadRequest(String),

    /// The provider lookup failed.
    #[error("{0}")]
    Lookup(#[from] LookupError),

    /// A page template failed to render.
    #[error("page render error: {0}")]
    Page(#[from] PageError),
}

impl ApiError {
    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Lookup(_) | Self::Page(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = LookupResponse::failure(self.to_string());
        (status, axum::Json(body)).into_response()
    }
}
