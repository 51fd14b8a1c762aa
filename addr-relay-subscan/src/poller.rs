//! Periodic poll loop.
//!
//! One cycle per tick, the first tick immediately. A failed cycle is logged
//! and leaves the cache alone; the next attempt is simply the next tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use addr_relay_cache::CountCache;
use addr_relay_core::constants::{apply_correction, COUNT_CORRECTION, DEFAULT_POLL_INTERVAL};
use addr_relay_core::error::{RelayError, Result};
use addr_relay_core::traits::CountSource;

/// Poll loop configuration.
#[derive(Clone, Copy, Debug)]
pub struct PollerConfig {
    /// Time between cycles
    pub interval: Duration,
    /// Subtracted from every raw upstream count
    pub correction: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            correction: COUNT_CORRECTION,
        }
    }
}

/// Drives a [`CountSource`] into a [`CountCache`].
pub struct Poller {
    source: Arc<dyn CountSource>,
    cache: Arc<CountCache>,
    config: PollerConfig,
}

impl Poller {
    /// Creates a poller writing into `cache`.
    ///
    /// Fails with `ConfigError` on a zero interval, which the timer cannot run.
    pub fn new(
        source: Arc<dyn CountSource>,
        cache: Arc<CountCache>,
        config: PollerConfig,
    ) -> Result<Self> {
        if config.interval.is_zero() {
            return Err(RelayError::ConfigError("poll interval must be non-zero".into()));
        }

        Ok(Self {
            source,
            cache,
            config,
        })
    }

    /// Runs a single poll cycle.
    ///
    /// On success the corrected count is stored and returned. On failure the
    /// cached count is untouched and the error is returned after logging.
    pub async fn poll_once(&self) -> Result<u64> {
        match self.source.fetch_count().await {
            Ok(raw) => {
                let count = apply_correction(raw, self.config.correction);
                self.cache.set(count);
                debug!(source = self.source.name(), raw, count, "Updated cached address count");
                Ok(count)
            }
            Err(err) => {
                let failures = self.cache.record_failure();
                let snapshot = self.cache.snapshot();
                warn!(
                    source = self.source.name(),
                    error = %err,
                    failures,
                    stale_count = snapshot.count,
                    last_success_age = ?snapshot.age(),
                    "Poll failed, keeping cached count"
                );
                Err(err)
            }
        }
    }

    /// Starts the loop on the current runtime.
    pub fn spawn(self) -> PollerHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let interval = self.config.interval;

        let task = tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(source = self.source.name(), ?interval, "Poller started");

            loop {
                // First tick completes immediately.
                tokio::select! {
                    biased;
                    _ = stop_rx.changed() => break,
                    _ = timer.tick() => {}
                }
                tokio::select! {
                    biased;
                    _ = stop_rx.changed() => break,
                    _ = self.poll_once() => {}
                }
            }

            info!(source = self.source.name(), "Poller stopped");
        });

        PollerHandle {
            stop: stop_tx,
            task,
        }
    }
}

/// Handle to a running poll loop.
///
/// Dropping the handle also stops the loop.
pub struct PollerHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Stops the loop and waits for it to exit.
    ///
    /// An in-flight upstream request is abandoned.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        if let Err(err) = self.task.await {
            warn!(error = %err, "Poller task ended abnormally");
        }
    }

    /// Returns true once the loop has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
