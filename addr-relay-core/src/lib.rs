//! # addr-relay core
//!
//! Foundational pieces shared by every relay crate:
//!
//! - **Errors**: `RelayError` and the crate-wide `Result` alias
//! - **Constants**: upstream defaults, poll cadence, correction constant
//! - **Traits**: `CountSource`, the seam between the poller and the upstream
//!
//! ## Example
//!
//! ```rust
//! use addr_relay_core::{apply_correction, COUNT_CORRECTION};
//!
//! assert_eq!(apply_correction(1000, COUNT_CORRECTION), 982);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;

pub use constants::*;
pub use error::{RelayError, Result};
pub use traits::*;
