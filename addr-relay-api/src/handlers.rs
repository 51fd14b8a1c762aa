//! Route handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use addr_relay_cache::CountBody;

use crate::error::ApiError;
use crate::state::AppState;

const ALLOWED_METHODS: &str = "GET, OPTIONS";
const ALLOWED_HEADERS: &str = "*";
const PREFLIGHT_MAX_AGE: &str = "86400";

/// GET /api
///
/// Reads the cache only; never waits on upstream.
pub async fn unique_address_count(State(state): State<Arc<AppState>>) -> Json<CountBody> {
    Json(state.cache.body())
}

/// OPTIONS on any path.
pub async fn preflight() -> Response {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS),
            (header::ACCESS_CONTROL_MAX_AGE, PREFLIGHT_MAX_AGE),
        ],
    )
        .into_response()
}

/// Any other method on `/api`.
pub async fn method_not_found() -> ApiError {
    ApiError::not_found()
}

/// Any path other than `/api`.
pub async fn fallback(method: Method) -> Response {
    if method == Method::OPTIONS {
        preflight().await
    } else {
        ApiError::not_found().into_response()
    }
}
