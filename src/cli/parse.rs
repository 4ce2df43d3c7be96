//! CLI parse: clap types for regwatch. No behavior; definitions only.

use crate::output::OutputFormat;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Transport used to reach the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

/// Watch an etcd registry path and run a command whenever it settles.
///
/// The command receives the current registry state on standard input in the
/// selected format.
#[derive(Parser, Debug)]
#[command(name = "regwatch")]
#[command(about = "Run a command with the current registry tree whenever an etcd subtree settles")]
pub struct Cli {
    /// Command and arguments to run on every stable state
    #[arg(value_name = "SCRIPT", required = true, num_args = 1.., trailing_var_arg = true)]
    pub script: Vec<String>,

    /// etcd host (default localhost)
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// etcd port (default 4001)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// etcd endpoint in URL format, e.g. http://10.0.0.5:2379
    #[arg(short, long)]
    pub url: Option<String>,

    /// Protocol used to connect
    #[arg(long, value_enum)]
    pub protocol: Option<Protocol>,

    /// Output format (default json)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Registry path or entry to watch (default /)
    #[arg(short = 'd', long)]
    pub path: Option<String>,

    /// Version to start watching from
    #[arg(long, value_name = "NUM")]
    pub wait_index: Option<u64>,

    /// Run only once, then exit
    #[arg(short = '1', long)]
    pub one_event: bool,

    /// Do not try to reconnect
    #[arg(long)]
    pub no_reconnect: bool,

    /// Do not track all changes recursively from path
    #[arg(long)]
    pub no_recursive: bool,

    /// Seconds to wait before reconnecting after the connection is lost
    #[arg(long, value_name = "SECS")]
    pub reconnect_timeout: Option<u64>,

    /// Do not wait for a stable state, run the command on every change
    #[arg(long)]
    pub no_stable: bool,

    /// Seconds without changes that count as stable (default 1)
    #[arg(long, value_name = "SECS")]
    pub stable_timeout: Option<u64>,

    /// Enable debug logging for regwatch
    #[arg(long)]
    pub debug: bool,

    /// Configuration file path (toml, yaml or json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
