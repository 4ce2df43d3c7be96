//! Integration tests for the registry watcher

mod cli_run;
mod command_action;
mod config_loading;
