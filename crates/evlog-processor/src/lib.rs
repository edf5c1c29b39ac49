//! Evlog Processor
//!
//! Ingests batches of change-log records from an append-only event source,
//! classifies each record by its declared event kind, and routes it to an
//! inline synchronous processor or an asynchronous remote-task launcher.
//! Partial failures from both paths are aggregated into a single report
//! for the caller.

pub mod clients;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod secrets;
pub mod stores;

// Re-export the primary entry points
pub use config::Config;
pub use error::{LaunchError, PipelineError, PipelineResult, WriteError};
pub use pipeline::{BatchCoordinator, Collaborators, FailureReport, StreamEvent};
