//! Downstream command
//!
//! Runs the configured command once per stable snapshot, with the encoded
//! snapshot on its standard input. The payload is staged in an anonymous
//! temporary file so a command that never reads stdin cannot stall the loop.

use crate::error::WatchError;
use crate::output::OutputFormat;
use crate::tree::Tree;
use crate::watch::SnapshotSink;
use async_trait::async_trait;
use std::io::{Seek, SeekFrom, Write};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Command invoked for every stable snapshot
#[derive(Debug, Clone)]
pub struct CommandAction {
    program: String,
    args: Vec<String>,
    format: OutputFormat,
}

impl CommandAction {
    /// Build from an argv vector; the first element is the program.
    pub fn new(argv: Vec<String>, format: OutputFormat) -> Result<Self, WatchError> {
        let mut argv = argv.into_iter();
        let program = argv
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| WatchError::ConfigError("No command given".to_string()))?;

        Ok(Self {
            program,
            args: argv.collect(),
            format,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Encode `snapshot`, run the command on it and wait for it to exit.
    pub async fn run(&self, snapshot: &Tree) -> Result<ExitStatus, WatchError> {
        let payload = self.format.encode(snapshot.root())?;

        let mut stdin = tempfile::tempfile()?;
        stdin.write_all(&payload)?;
        stdin.flush()?;
        stdin.seek(SeekFrom::Start(0))?;

        debug!(
            program = %self.program,
            args = ?self.args,
            bytes = payload.len(),
            format = %self.format,
            "Calling command"
        );

        // An interrupted watcher takes the running command down with it.
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::from(stdin))
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| WatchError::ActionError(format!("Failed to run {}: {}", self.program, e)))
    }
}

#[async_trait]
impl SnapshotSink for CommandAction {
    async fn deliver(&mut self, snapshot: &Tree) -> Result<(), WatchError> {
        let status = self.run(snapshot).await?;
        if status.success() {
            info!(program = %self.program, version = ?snapshot.version(), "Command completed");
        } else {
            // Failed runs are not retried; the next stable state triggers a new run.
            warn!(
                program = %self.program,
                version = ?snapshot.version(),
                status = %status,
                "Command exited unsuccessfully"
            );
        }
        Ok(())
    }
}
