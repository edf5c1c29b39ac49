//! Processor-specific error types
//!
//! Two propagation classes, kept deliberately separate:
//!
//! - [`PipelineError`] is structural. Decode and classify failures abort the
//!   whole invocation; the caller treats the batch as failed and relies on
//!   the change feed's own redelivery.
//! - [`WriteError`] / [`LaunchError`] are record-level. They are recovered
//!   in place, recorded in the failure report, and never abort the batch.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for pipeline operations
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Fatal, invocation-aborting errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to decode change record: {0}")]
    Decode(String),

    #[error("Record at batch position {index} is missing the event_type discriminator")]
    MissingDiscriminator { index: usize },
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Decode(err.to_string())
    }
}

/// Record-level failure writing to the relational or mirror store
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum WriteError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for WriteError {
    fn from(err: sqlx::Error) -> Self {
        WriteError::Database(err.to_string())
    }
}

/// Record-level failure reaching the task-launch backend
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum LaunchError {
    #[error("Task launch transport error: {0}")]
    Transport(String),
}
