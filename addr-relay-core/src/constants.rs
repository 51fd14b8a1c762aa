//! Relay constants.
//!
//! Defaults for the upstream explorer, the poll cadence, and the served value.
//! Every one of these can be overridden through `RelayConfig`.

use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════════════
// UPSTREAM
// ═══════════════════════════════════════════════════════════════════════════════

/// Default block-explorer host queried for the account count.
pub const DEFAULT_SUBSCAN_BASE_URL: &str = "https://polkadot.api.subscan.io";

/// Path of the accounts listing endpoint, appended to the base URL.
pub const ACCOUNTS_PATH: &str = "/api/scan/accounts";

/// Header carrying the upstream API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Default timeout for one upstream request, in seconds.
///
/// Kept below [`DEFAULT_POLL_INTERVAL_SECS`] so a hung request finishes
/// before the next tick is due.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 8;

// ═══════════════════════════════════════════════════════════════════════════════
// POLLING
// ═══════════════════════════════════════════════════════════════════════════════

/// Default period between poll cycles, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Default period between poll cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS);

/// Subtracted from the raw upstream count before it is cached.
/// Excludes the known vesting accounts, which are not user addresses.
pub const COUNT_CORRECTION: u64 = 18;

/// Cached value served before the first successful poll.
pub const DEFAULT_INITIAL_COUNT: u64 = 0;

// ═══════════════════════════════════════════════════════════════════════════════
// SERVER
// ═══════════════════════════════════════════════════════════════════════════════

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8000;

/// The single read endpoint.
pub const API_ROUTE: &str = "/api";

/// Body of every 404 response.
pub const NOT_FOUND_BODY: &str = "Not found";

/// Applies the correction constant to a raw upstream count.
///
/// Saturates at zero instead of wrapping.
pub fn apply_correction(raw: u64, correction: u64) -> u64 {
    raw.saturating_sub(correction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(1000, 982 ; "typical count")]
    #[test_case(18, 0 ; "exactly the correction")]
    #[test_case(5, 0 ; "below the correction saturates")]
    #[test_case(0, 0 ; "empty chain")]
    fn test_apply_correction(raw: u64, expected: u64) {
        assert_eq!(apply_correction(raw, COUNT_CORRECTION), expected);
    }

    #[test]
    fn test_timeout_below_interval() {
        assert!(DEFAULT_REQUEST_TIMEOUT_SECS < DEFAULT_POLL_INTERVAL_SECS);
    }
}
