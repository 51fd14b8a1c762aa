//! In-memory cache for the served address count.

use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::Serialize;

use addr_relay_core::constants::DEFAULT_INITIAL_COUNT;

/// Point-in-time view of the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheSnapshot {
    /// Value served to clients
    pub count: u64,
    /// When the last successful poll stored `count`, if any has
    pub updated_at: Option<Instant>,
    /// Successful polls since startup
    pub successes: u64,
    /// Failed polls since the last success
    pub consecutive_failures: u64,
}

impl CacheSnapshot {
    fn seeded(count: u64) -> Self {
        Self {
            count,
            updated_at: None,
            successes: 0,
            consecutive_failures: 0,
        }
    }

    /// Time since the last successful poll.
    pub fn age(&self) -> Option<Duration> {
        self.updated_at.map(|t| t.elapsed())
    }
}

/// Body of `GET /api`.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CountBody {
    /// The cached, corrected address count
    pub unique_address_count: u64,
}

/// The relay's shared count.
///
/// Written only by the poller and read by every request. Each write swaps
/// the whole snapshot under the lock, so readers see either the previous
/// or the new value and nothing in between. The lock is never held across
/// an `.await`.
pub struct CountCache {
    inner: RwLock<CacheSnapshot>,
}

impl CountCache {
    /// Creates a cache seeded with the default initial count.
    pub fn new() -> Self {
        Self::with_initial(DEFAULT_INITIAL_COUNT)
    }

    /// Creates a cache seeded with `initial`.
    pub fn with_initial(initial: u64) -> Self {
        Self {
            inner: RwLock::new(CacheSnapshot::seeded(initial)),
        }
    }

    /// Returns the served count.
    pub fn get(&self) -> u64 {
        self.inner.read().count
    }

    /// Stores a freshly polled count.
    pub fn set(&self, count: u64) {
        let mut inner = self.inner.write();
        *inner = CacheSnapshot {
            count,
            updated_at: Some(Instant::now()),
            successes: inner.successes + 1,
            consecutive_failures: 0,
        };
    }

    /// Notes a failed poll. The served count is left untouched.
    ///
    /// Returns the number of consecutive failures so far.
    pub fn record_failure(&self) -> u64 {
        let mut inner = self.inner.write();
        inner.consecutive_failures += 1;
        inner.consecutive_failures
    }

    /// Returns the full snapshot.
    pub fn snapshot(&self) -> CacheSnapshot {
        *self.inner.read()
    }

    /// Returns the `GET /api` body for the current count.
    pub fn body(&self) -> CountBody {
        CountBody {
            unique_address_count: self.get(),
        }
    }
}

impl Default for CountCache {
    fn default() -> Self {
        Self::new()
    }
}
