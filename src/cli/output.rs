//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::WatchError;

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &WatchError) -> String {
    match e {
        WatchError::ConfigError(msg) => format!("regwatch: {}", msg),
        other => format!("regwatch: {}", other),
    }
}
