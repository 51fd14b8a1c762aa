//! API route configuration.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue},
    routing::get,
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

use addr_relay_core::constants::API_ROUTE;

use crate::handlers;
use crate::state::AppState;

/// Creates the router with the read endpoint and CORS headers.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            API_ROUTE,
            get(handlers::unique_address_count)
                .options(handlers::preflight)
                .fallback(handlers::method_not_found),
        )
        .fallback(handlers::fallback)
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
}
