//! Error types shared across Snipline crates.

use thiserror::Error;

/// Errors that are not specific to a single subsystem.
#[derive(Error, Debug)]
pub enum SniplineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, SniplineError>;
