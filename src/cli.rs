//! CLI domain: parse, route and output only.
//! The route builds the watch loop from configuration; no loop logic lives here.

mod output;
mod parse;
mod route;

pub use output::map_error;
pub use parse::{Cli, Protocol};
pub use route::{apply_cli_overrides, RunContext, RunExit};
