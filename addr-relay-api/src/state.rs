//! App state and relay configuration.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use addr_relay_cache::CountCache;
use addr_relay_core::constants::{
    COUNT_CORRECTION, DEFAULT_INITIAL_COUNT, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_PORT,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SUBSCAN_BASE_URL,
};
use addr_relay_core::error::{RelayError, Result};
use addr_relay_subscan::{PollerConfig, SubscanConfig};

/// Relay configuration.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Listening port
    pub port: u16,
    /// Upstream explorer settings
    pub subscan: SubscanConfig,
    /// Seconds between poll cycles
    pub poll_interval_secs: u64,
    /// Served before the first successful poll
    pub initial_count: u64,
    /// Subtracted from the raw upstream count
    pub correction: u64,
}

impl RelayConfig {
    /// Creates config with defaults for everything but the API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            port: DEFAULT_PORT,
            subscan: SubscanConfig::new(api_key),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            initial_count: DEFAULT_INITIAL_COUNT,
            correction: COUNT_CORRECTION,
        }
    }

    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds config from any variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup("SUBSCAN_API_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| RelayError::ConfigError("SUBSCAN_API_KEY is not set".into()))?;

        let base_url = lookup("SUBSCAN_BASE_URL").unwrap_or_else(|| DEFAULT_SUBSCAN_BASE_URL.into());
        let timeout = parse_var(&lookup, "RELAY_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;

        Ok(Self {
            port: parse_var(&lookup, "RELAY_PORT", DEFAULT_PORT)?,
            subscan: SubscanConfig::new(api_key)
                .with_base_url(base_url)
                .with_timeout(timeout),
            poll_interval_secs: parse_var(&lookup, "RELAY_POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)?,
            initial_count: parse_var(&lookup, "RELAY_INITIAL_COUNT", DEFAULT_INITIAL_COUNT)?,
            correction: parse_var(&lookup, "RELAY_COUNT_CORRECTION", COUNT_CORRECTION)?,
        })
    }

    /// Rejects values the relay cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(RelayError::ConfigError("poll interval must be at least 1s".into()));
        }
        if self.subscan.timeout_seconds == 0 {
            return Err(RelayError::ConfigError("request timeout must be at least 1s".into()));
        }
        Ok(())
    }

    /// Poll loop settings derived from this config.
    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: Duration::from_secs(self.poll_interval_secs),
            correction: self.correction,
        }
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T> {
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| RelayError::ConfigError(format!("{} has invalid value '{}'", name, raw))),
    }
}

/// Shared state handed to every request.
pub struct AppState {
    /// The served count
    pub cache: Arc<CountCache>,
}

impl AppState {
    /// Wraps an existing cache.
    pub fn new(cache: Arc<CountCache>) -> Self {
        Self { cache }
    }
}
