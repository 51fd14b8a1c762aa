//! Upstream side of the relay.
//!
//! [`SubscanClient`] asks the block explorer for its account count and
//! [`Poller`] runs it on a timer, writing successes into the shared
//! [`CountCache`](addr_relay_cache::CountCache).

#![warn(missing_docs)]

mod client;
mod poller;

pub use client::{AccountsRequest, SubscanClient, SubscanConfig};
pub use poller::{Poller, PollerConfig, PollerHandle};
