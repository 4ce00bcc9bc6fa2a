//! Error types for the log store.

use thiserror::Error;

/// Errors that can occur in the logging system.
#[derive(Debug, Error)]
pub enum LogError {
    /// A level string did not name one of the four levels.
    #[error("unknown log level: {0}")]
    UnknownLevel(String),

    /// A format string did not name a known output format.
    #[error("unknown output format: {0}")]
    UnknownFormat(String),
}

/// Result type alias for log operations.
pub type Result<T> = std::result::Result<T, LogError>;
