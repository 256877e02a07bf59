//! Error types for Mindwell

use thiserror::Error;

/// Errors that can occur while loading, validating or persisting engine state.
///
/// The personalization, scoring and daily-selection computations themselves
/// never fail; only the I/O and parsing around them do.
#[derive(Debug, Error)]
pub enum WellnessError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid behavior event: {0}")]
    InvalidEvent(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}
