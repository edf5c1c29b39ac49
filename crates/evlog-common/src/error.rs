//! Error types shared across the evlog workspace

use thiserror::Error;

/// Result type alias for evlog operations
pub type Result<T> = std::result::Result<T, EvlogError>;

/// Main shared error type
#[derive(Error, Debug)]
pub enum EvlogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
