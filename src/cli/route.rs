//! CLI route: turns parsed arguments into a validated configuration and runs
//! the watch loop until it ends or the operator interrupts it.

use crate::action::CommandAction;
use crate::cli::parse::Cli;
use crate::config::{ConfigLoader, RegwatchConfig};
use crate::error::WatchError;
use crate::logging::LoggingConfig;
use crate::store::EtcdConnector;
use crate::watch::{DriverExit, SessionDriver};
use tracing::{debug, error, info};

/// How a run finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    /// The driver stopped on its own (one-shot or no reconnect)
    Finished(DriverExit),
    /// Ctrl-C was received
    Interrupted,
}

/// Runtime context for CLI execution: merged configuration and command.
pub struct RunContext {
    config: RegwatchConfig,
    script: Vec<String>,
}

impl RunContext {
    /// Load configuration layers, apply CLI overrides and validate.
    pub fn from_cli(cli: &Cli) -> Result<Self, WatchError> {
        let mut config = ConfigLoader::load(cli.config.as_deref())?;
        apply_cli_overrides(&mut config, cli);
        config.ensure_valid()?;

        Ok(Self {
            config,
            script: cli.script.clone(),
        })
    }

    pub fn new(config: RegwatchConfig, script: Vec<String>) -> Result<Self, WatchError> {
        config.ensure_valid()?;
        Ok(Self { config, script })
    }

    pub fn config(&self) -> &RegwatchConfig {
        &self.config
    }

    /// Run the watch loop, stopping cleanly on Ctrl-C.
    pub async fn run(&self) -> Result<RunExit, WatchError> {
        let base_url = self.config.store.base_url()?;
        let connector = EtcdConnector::new(base_url.clone(), self.config.store.connect_timeout());
        let mut action = CommandAction::new(self.script.clone(), self.config.output.format)?;
        let mut driver = SessionDriver::new(connector, self.config.watch.session_options());

        info!(
            endpoint = %base_url,
            path = %self.config.watch.path,
            format = %self.config.output.format,
            program = %action.program(),
            "Watching registry"
        );

        tokio::select! {
            result = driver.run(&mut action) => result.map(RunExit::Finished),
            signal = tokio::signal::ctrl_c() => interrupted(signal),
        }
    }
}

/// Outcome of waiting for Ctrl-C. Failing to install the handler is an error,
/// not an interrupt.
fn interrupted(signal: std::io::Result<()>) -> Result<RunExit, WatchError> {
    match signal {
        Ok(()) => {
            debug!("Interrupted, shutting down");
            Ok(RunExit::Interrupted)
        }
        Err(e) => {
            error!(error = %e, "Failed to listen for Ctrl-C");
            Err(WatchError::IoError(e))
        }
    }
}

/// Apply command-line flags over the loaded configuration.
pub fn apply_cli_overrides(config: &mut RegwatchConfig, cli: &Cli) {
    if let Some(ref host) = cli.host {
        config.store.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.store.port = port;
    }
    if let Some(protocol) = cli.protocol {
        config.store.protocol = protocol.as_str().to_string();
    }
    if let Some(ref url) = cli.url {
        config.store.url = Some(url.clone());
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }
    if let Some(ref path) = cli.path {
        config.watch.path = path.clone();
    }
    if let Some(version) = cli.wait_index {
        config.watch.start_version = Some(version);
    }
    if cli.one_event {
        config.watch.one_event = true;
    }
    if cli.no_reconnect {
        config.watch.reconnect = false;
    }
    if cli.no_recursive {
        config.watch.recursive = false;
    }
    if let Some(secs) = cli.reconnect_timeout {
        config.watch.reconnect_timeout_secs = secs;
    }
    if cli.no_stable {
        config.watch.stable = false;
    }
    if let Some(secs) = cli.stable_timeout {
        config.watch.stable_timeout_secs = secs;
    }

    apply_logging_overrides(&mut config.logging, cli);
}

/// Precedence: explicit log flags override `--debug`, which overrides the
/// config file.
fn apply_logging_overrides(logging: &mut LoggingConfig, cli: &Cli) {
    if cli.debug {
        logging
            .modules
            .insert("regwatch".to_string(), "debug".to_string());
    }
    if let Some(ref level) = cli.log_level {
        logging.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        logging.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        logging.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        logging.file = Some(file.clone());
        if cli.log_output.is_none() {
            logging.output = "file".to_string();
        }
    }
}
