//! Regwatch CLI Binary
//!
//! Runs a command with the current registry tree whenever an etcd subtree
//! settles.

use clap::Parser;
use regwatch::cli::{map_error, Cli, RunContext, RunExit};
use regwatch::logging::init_logging;
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    // Configuration is needed before logging so the file layer can set it up
    let context = match RunContext::from_cli(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(&context.config().logging) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("regwatch: failed to start runtime: {}", e);
            process::exit(1);
        }
    };

    match runtime.block_on(context.run()) {
        Ok(RunExit::Finished(exit)) => {
            info!(?exit, "Watch finished");
        }
        Ok(RunExit::Interrupted) => {
            info!("Watch interrupted");
        }
        Err(e) => {
            error!("Watch failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    }
}
