//! # addr-relay API server
//!
//! Serves the cached address count to the telemetry dashboard and runs the
//! poll loop that keeps it fresh.
//!
//! ## Endpoints
//!
//! - `GET /api` - `{"uniqueAddressCount": <int>}`
//! - `OPTIONS <any>` - `204` CORS preflight
//! - anything else - `404 Not found`
//!
//! ## Example
//!
//! ```rust,ignore
//! use addr_relay_api::{RelayConfig, RelayServer};
//!
//! let config = RelayConfig::from_env()?;
//! let server = RelayServer::new(config)?;
//! server.run(([0, 0, 0, 0], 8000)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod error;
mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, RelayConfig};

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use addr_relay_cache::CountCache;
use addr_relay_core::error::Result;
use addr_relay_core::traits::CountSource;
use addr_relay_subscan::{Poller, SubscanClient};

/// The relay: cache, poll loop, and HTTP surface.
pub struct RelayServer {
    config: RelayConfig,
    state: Arc<AppState>,
    source: Arc<dyn CountSource>,
}

impl RelayServer {
    /// Creates a relay polling the configured Subscan endpoint.
    pub fn new(config: RelayConfig) -> Result<Self> {
        config.validate()?;
        let client = SubscanClient::with_config(config.subscan.clone())?;
        Self::with_source(config, Arc::new(client))
    }

    /// Creates a relay polling an arbitrary count source.
    pub fn with_source(config: RelayConfig, source: Arc<dyn CountSource>) -> Result<Self> {
        config.validate()?;
        let cache = Arc::new(CountCache::with_initial(config.initial_count));
        Ok(Self {
            config,
            state: Arc::new(AppState::new(cache)),
            source,
        })
    }

    /// Returns the shared cache.
    pub fn cache(&self) -> Arc<CountCache> {
        self.state.cache.clone()
    }

    /// Creates the router with tracing attached.
    pub fn router(&self) -> Router {
        create_router(self.state.clone()).layer(TraceLayer::new_for_http())
    }

    /// Runs the relay on `addr` until Ctrl-C.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> Result<()> {
        let listener = TcpListener::bind(addr.into()).await?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Runs the relay on an already bound listener until `shutdown` resolves.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let addr = listener.local_addr()?;
        let poller = Poller::new(
            self.source.clone(),
            self.state.cache.clone(),
            self.config.poller_config(),
        )?
        .spawn();

        info!(%addr, upstream = %self.config.subscan.accounts_url(), "Address-count relay listening");

        let served = axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await;

        poller.shutdown().await;
        info!("Address-count relay stopped");
        served.map_err(Into::into)
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
