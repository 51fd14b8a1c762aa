//! API error handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use addr_relay_core::constants::NOT_FOUND_BODY;

/// Error returned by the HTTP layer.
///
/// Rendered as a plain-text body; the dashboard only ever parses the
/// success JSON.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Unknown path or method.
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, NOT_FOUND_BODY)
    }

    /// Returns the HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}
