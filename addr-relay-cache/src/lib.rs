//! Cached address count.
//!
//! The single value the relay serves, owned explicitly and shared through `Arc`.

mod cache;

pub use cache::{CacheSnapshot, CountBody, CountCache};
