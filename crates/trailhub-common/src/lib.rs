//! TrailHub Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared logging setup, environment helpers and error types for the TrailHub
//! workspace members.
//!
//! # Example
//!
//! ```no_run
//! use trailhub_common::env::{optional_var, parse_var};
//!
//! fn port() -> trailhub_common::Result<u16> {
//!     Ok(parse_var("APP_DEFAULT_PORT")?.unwrap_or(1993))
//! }
//! # let _ = optional_var("APP_NAME");
//! ```

pub mod env;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{Result, TrailHubError};
