//! Layered configuration: global file, explicit file, environment and flags

use super::test_utils::ConfigEnv;
use clap::Parser;
use regwatch::cli::{Cli, RunContext};
use regwatch::config::{global_config_path, ConfigLoader, RegwatchConfig};
use regwatch::output::OutputFormat;
use std::time::Duration;

#[test]
fn test_defaults_without_any_source() {
    let _env = ConfigEnv::new();
    let config = ConfigLoader::load(None).unwrap();
    assert_eq!(config, RegwatchConfig::default());
}

#[test]
fn test_global_path_follows_xdg_config_home() {
    let env = ConfigEnv::new();
    let path = global_config_path().unwrap();
    assert_eq!(
        path,
        env.config_home.path().join("regwatch").join("config.toml")
    );
}

#[test]
fn test_global_file_is_picked_up() {
    let env = ConfigEnv::new();
    env.write_global(
        r#"
[store]
url = "http://10.1.2.3:2379"

[watch]
path = "/global"
reconnect_timeout_secs = 12
"#,
    );

    let config = ConfigLoader::load(None).unwrap();
    assert_eq!(config.store.url.as_deref(), Some("http://10.1.2.3:2379"));
    assert_eq!(config.watch.path, "/global");
    assert_eq!(
        config.watch.session_options().reconnect_backoff,
        Duration::from_secs(12)
    );
}

#[test]
fn test_environment_overrides_files() {
    let mut env = ConfigEnv::new();
    env.write_global("[watch]\npath = \"/global\"\nstable_timeout_secs = 2\n");

    let explicit = env.config_home.path().join("explicit.yaml");
    std::fs::write(&explicit, "watch:\n  path: /explicit\noutput:\n  format: yaml\n").unwrap();

    env.set_var("REGWATCH__WATCH__PATH", "/from-env");
    env.set_var("REGWATCH__STORE__PORT", "2379");

    let config = ConfigLoader::load(Some(&explicit)).unwrap();
    assert_eq!(config.watch.path, "/from-env");
    assert_eq!(config.watch.stable_timeout_secs, 2);
    assert_eq!(config.store.port, 2379);
    assert_eq!(config.output.format, OutputFormat::Yaml);
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let env = ConfigEnv::new();
    let missing = env.config_home.path().join("nope.toml");
    assert!(ConfigLoader::load(Some(&missing)).is_err());
}

#[test]
fn test_flags_override_every_file_layer() {
    let env = ConfigEnv::new();
    env.write_global("[store]\nhost = \"etcd-a\"\n\n[watch]\npath = \"/global\"\none_event = false\n");

    let cli = Cli::try_parse_from([
        "regwatch",
        "-H",
        "etcd-b",
        "-d",
        "/flag",
        "--one-event",
        "handler",
    ])
    .unwrap();
    let context = RunContext::from_cli(&cli).unwrap();

    assert_eq!(context.config().store.host, "etcd-b");
    assert_eq!(context.config().watch.path, "/flag");
    assert!(context.config().watch.one_event);
}

#[test]
fn test_invalid_layered_config_is_rejected() {
    let env = ConfigEnv::new();
    env.write_global("[logging]\nformat = \"xml\"\n");

    let cli = Cli::try_parse_from(["regwatch", "handler"]).unwrap();
    assert!(RunContext::from_cli(&cli).is_err());

    let cli = Cli::try_parse_from(["regwatch", "--log-format", "json", "handler"]).unwrap();
    assert!(RunContext::from_cli(&cli).is_ok());
}
