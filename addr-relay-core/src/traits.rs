//! Common traits for the relay.

use async_trait::async_trait;

use crate::error::Result;

/// Anything that can report the current raw address count.
///
/// The production implementation is the Subscan HTTP client; tests plug in
/// scripted sources to drive the poller through success and failure.
#[async_trait]
pub trait CountSource: Send + Sync {
    /// Fetches the raw count, before any correction is applied.
    async fn fetch_count(&self) -> Result<u64>;

    /// Short label used in log fields.
    fn name(&self) -> &str {
        "count-source"
    }
}
