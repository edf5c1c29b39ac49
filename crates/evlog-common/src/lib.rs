//! Evlog Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling and logging for the evlog workspace members.
//!
//! # Overview
//!
//! - **Error Handling**: the workspace-wide [`EvlogError`] and [`Result`] alias
//! - **Logging**: `tracing`-based logging configuration and initialization
//!
//! # Example
//!
//! ```no_run
//! use evlog_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     tracing::info!("service started");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{EvlogError, Result};
