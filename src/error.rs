//! Error types for the registry watcher.

use thiserror::Error;

/// Failures reported by a store connection.
///
/// This is a closed set: the watch loop matches on every variant to decide
/// whether a failure is a transient miss, a quiescence signal or the end of
/// the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Store unreachable: {0}")]
    Unreachable(String),

    #[error("Unexpected store response: {0}")]
    Protocol(String),
}

/// Top-level errors surfaced to the binary
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("Output encoding failed: {0}")]
    OutputError(String),

    #[error("Action failed: {0}")]
    ActionError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<config::ConfigError> for WatchError {
    fn from(err: config::ConfigError) -> Self {
        WatchError::ConfigError(err.to_string())
    }
}
