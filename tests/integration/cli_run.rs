//! CLI parsing and error surface

use clap::Parser;
use regwatch::cli::{map_error, Cli, Protocol};
use regwatch::error::{StoreError, WatchError};
use regwatch::output::OutputFormat;

#[test]
fn test_defaults_leave_overrides_unset() {
    let cli = Cli::try_parse_from(["regwatch", "handler"]).unwrap();
    assert!(cli.host.is_none());
    assert!(cli.port.is_none());
    assert!(cli.format.is_none());
    assert!(!cli.one_event);
    assert!(!cli.no_stable);
    assert_eq!(cli.script, vec!["handler"]);
}

#[test]
fn test_value_enums() {
    let cli = Cli::try_parse_from([
        "regwatch",
        "--protocol",
        "https",
        "--format",
        "bincode",
        "handler",
    ])
    .unwrap();
    assert_eq!(cli.protocol, Some(Protocol::Https));
    assert_eq!(cli.format, Some(OutputFormat::Bincode));

    assert!(Cli::try_parse_from(["regwatch", "--protocol", "gopher", "handler"]).is_err());
    assert!(Cli::try_parse_from(["regwatch", "--format", "xml", "handler"]).is_err());
}

#[test]
fn test_flags_after_script_belong_to_script() {
    let cli = Cli::try_parse_from(["regwatch", "--no-stable", "sh", "-c", "cat >/dev/null"]).unwrap();
    assert!(cli.no_stable);
    assert_eq!(cli.script, vec!["sh", "-c", "cat >/dev/null"]);
}

#[test]
fn test_error_messages_are_prefixed() {
    let message = map_error(&WatchError::ConfigError("Path cannot be empty".to_string()));
    assert_eq!(message, "regwatch: Path cannot be empty");

    let message = map_error(&WatchError::StoreError(StoreError::Timeout));
    assert!(message.starts_with("regwatch: "));
}
