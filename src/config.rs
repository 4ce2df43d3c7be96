//! Configuration System
//!
//! Layered configuration for the watcher: built-in defaults, the user's
//! global config file, an explicit config file, `REGWATCH__*` environment
//! variables and finally command-line flags. Validation collects every
//! problem instead of stopping at the first one.

use crate::error::WatchError;
use crate::logging::{self, LoggingConfig};
use crate::output::OutputFormat;
use crate::tree::path::normalize_watch_path;
use crate::watch::{SessionOptions, TrackOptions};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegwatchConfig {
    /// Store endpoint
    #[serde(default)]
    pub store: StoreConfig,

    /// Watch loop behavior
    #[serde(default)]
    pub watch: WatchConfig,

    /// Snapshot encoding
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the registry lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// http or https
    #[serde(default = "default_protocol")]
    pub protocol: String,

    /// Full endpoint URL; takes precedence over host, port and protocol
    #[serde(default)]
    pub url: Option<String>,

    /// Bound on establishing a TCP connection
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    4001
}

fn default_protocol() -> String {
    "http".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            protocol: default_protocol(),
            url: None,
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl StoreConfig {
    /// Base URL of the store, from `url` or host/port/protocol
    pub fn base_url(&self) -> Result<Url, WatchError> {
        let raw = match &self.url {
            Some(url) => url.clone(),
            None => format!("{}://{}:{}", self.protocol, self.host, self.port),
        };

        let url = Url::parse(&raw)
            .map_err(|e| WatchError::ConfigError(format!("Invalid store URL '{}': {}", raw, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(WatchError::ConfigError(format!(
                "Invalid store URL '{}': scheme must be http or https",
                raw
            )));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(WatchError::ConfigError(format!(
                "Invalid store URL '{}': missing host",
                raw
            )));
        }

        Ok(url)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Validate store configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.url.is_none() {
            if self.host.trim().is_empty() {
                return Err("Host cannot be empty".to_string());
            }
            if self.port == 0 {
                return Err("Port cannot be zero".to_string());
            }
            if self.protocol != "http" && self.protocol != "https" {
                return Err(format!(
                    "Invalid protocol: {} (must be 'http' or 'https')",
                    self.protocol
                ));
            }
        }

        self.base_url().map(|_| ()).map_err(|e| e.to_string())
    }
}

/// Watch loop settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Registry path or entry to watch
    #[serde(default = "default_path")]
    pub path: String,

    /// Track all changes below `path`
    #[serde(default = "default_true")]
    pub recursive: bool,

    /// Version to start watching from
    #[serde(default)]
    pub start_version: Option<u64>,

    /// Run the command once, then exit
    #[serde(default)]
    pub one_event: bool,

    /// Reconnect when the store connection is lost
    #[serde(default = "default_true")]
    pub reconnect: bool,

    #[serde(default = "default_reconnect_timeout_secs")]
    pub reconnect_timeout_secs: u64,

    /// Wait for a quiet period before running the command
    #[serde(default = "default_true")]
    pub stable: bool,

    #[serde(default = "default_stable_timeout_secs")]
    pub stable_timeout_secs: u64,

    /// Long-poll timeout while no update is pending
    #[serde(default = "default_initial_timeout_secs")]
    pub initial_timeout_secs: u64,

    /// Pause before re-reading a missing key
    #[serde(default = "default_not_found_backoff_secs")]
    pub not_found_backoff_secs: u64,
}

fn default_path() -> String {
    "/".to_string()
}

fn default_true() -> bool {
    true
}

fn default_reconnect_timeout_secs() -> u64 {
    30
}

fn default_stable_timeout_secs() -> u64 {
    1
}

fn default_initial_timeout_secs() -> u64 {
    30
}

fn default_not_found_backoff_secs() -> u64 {
    5
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            recursive: default_true(),
            start_version: None,
            one_event: false,
            reconnect: default_true(),
            reconnect_timeout_secs: default_reconnect_timeout_secs(),
            stable: default_true(),
            stable_timeout_secs: default_stable_timeout_secs(),
            initial_timeout_secs: default_initial_timeout_secs(),
            not_found_backoff_secs: default_not_found_backoff_secs(),
        }
    }
}

impl WatchConfig {
    /// Validate watch configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.path.trim().is_empty() {
            return Err("Path cannot be empty".to_string());
        }
        if !self.path.starts_with('/') {
            return Err(format!("Path must start with '/': {}", self.path));
        }
        if self.initial_timeout_secs == 0 {
            return Err("Initial timeout must be at least one second".to_string());
        }
        if self.stable && self.stable_timeout_secs == 0 {
            return Err("Stable timeout must be at least one second".to_string());
        }
        Ok(())
    }

    /// Loop options derived from this configuration
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            track: TrackOptions {
                path: normalize_watch_path(&self.path),
                recursive: self.recursive,
                stable_window: self
                    .stable
                    .then(|| Duration::from_secs(self.stable_timeout_secs)),
                initial_timeout: Duration::from_secs(self.initial_timeout_secs),
                not_found_backoff: Duration::from_secs(self.not_found_backoff_secs),
            },
            start_version: self.start_version,
            one_event: self.one_event,
            reconnect: self.reconnect,
            reconnect_backoff: Duration::from_secs(self.reconnect_timeout_secs),
        }
    }
}

/// Snapshot encoding settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Store(String),
    Watch(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Store(msg) => write!(f, "Store: {}", msg),
            ValidationError::Watch(msg) => write!(f, "Watch: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl RegwatchConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.store.validate() {
            errors.push(ValidationError::Store(e));
        }

        if let Err(e) = self.watch.validate() {
            errors.push(ValidationError::Watch(e));
        }

        if let Err(e) = logging::validate_format(&self.logging.format) {
            errors.push(ValidationError::Logging(e.to_string()));
        }
        if let Err(e) = logging::validate_output(&self.logging.output) {
            errors.push(ValidationError::Logging(e.to_string()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, folding all problems into a single error
    pub fn ensure_valid(&self) -> Result<(), WatchError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            WatchError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }
}
