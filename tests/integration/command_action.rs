//! End to end: scripted store, session driver and a real child process

#![cfg(unix)]

use super::test_utils::{fast_track, removed, set};
use regwatch::action::CommandAction;
use regwatch::error::StoreError;
use regwatch::output::OutputFormat;
use regwatch::store::{ScriptedConnector, ScriptedStore, StoreNode};
use regwatch::tree::Mapping;
use regwatch::watch::{DriverExit, SessionDriver, SessionOptions};
use std::time::Duration;
use tempfile::TempDir;

fn appending_action(out: &std::path::Path, format: OutputFormat) -> CommandAction {
    CommandAction::new(
        vec![
            "sh".to_string(),
            "-c".to_string(),
            format!("cat >> '{}'; echo >> '{}'", out.display(), out.display()),
        ],
        format,
    )
    .unwrap()
}

fn session_options() -> SessionOptions {
    SessionOptions {
        track: fast_track("/"),
        start_version: None,
        one_event: false,
        reconnect: false,
        reconnect_backoff: Duration::from_millis(5),
    }
}

#[tokio::test]
async fn test_command_runs_once_per_stable_state() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("runs.jsonl");

    let store = ScriptedStore::new(vec![
        Ok(vec![
            StoreNode::leaf("/svc/web/0", "10.0.0.1:80", 3),
            StoreNode::leaf("/svc/web/1", "10.0.0.2:80", 4),
        ]),
        Err(StoreError::Timeout),
        removed("/svc/web/1", 5),
        set("/svc/db/0", "10.0.1.1:5432", 6),
        Err(StoreError::Timeout),
    ]);
    let connector = ScriptedConnector::new(vec![store]);
    let mut driver = SessionDriver::new(connector, session_options());
    let mut action = appending_action(&out, OutputFormat::Json);

    assert_eq!(driver.run(&mut action).await.unwrap(), DriverExit::Disconnected);
    assert_eq!(driver.delivered(), 2);

    let contents = std::fs::read_to_string(&out).unwrap();
    let runs: Vec<serde_json::Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(
        runs,
        vec![
            serde_json::json!({"svc": {"web": {"0": "10.0.0.1:80", "1": "10.0.0.2:80"}}}),
            serde_json::json!({"svc": {"db": {"0": "10.0.1.1:5432"}, "web": {"0": "10.0.0.1:80"}}}),
        ]
    );
}

#[tokio::test]
async fn test_yaml_payload_decodes_to_same_tree() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("state.yaml");

    let store = ScriptedStore::new(vec![
        set("/config/replicas", "3", 1),
        Err(StoreError::Timeout),
    ]);
    let connector = ScriptedConnector::new(vec![store]);
    let mut options = session_options();
    options.one_event = true;
    let mut driver = SessionDriver::new(connector, options);
    let mut action = CommandAction::new(
        vec![
            "sh".to_string(),
            "-c".to_string(),
            format!("cat > '{}'", out.display()),
        ],
        OutputFormat::Yaml,
    )
    .unwrap();

    assert_eq!(driver.run(&mut action).await.unwrap(), DriverExit::OneEvent);

    let decoded: Mapping = serde_yaml::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let replicas = decoded
        .get("config")
        .and_then(|node| node.as_branch())
        .and_then(|branch| branch.get("replicas"))
        .and_then(|node| node.as_value());
    assert_eq!(replicas, Some("3"));
}

#[tokio::test]
async fn test_failing_command_does_not_stop_the_watch() {
    let store = ScriptedStore::new(vec![
        set("/a", "1", 1),
        Err(StoreError::Timeout),
        set("/a", "2", 2),
        Err(StoreError::Timeout),
    ]);
    let connector = ScriptedConnector::new(vec![store]);
    let mut driver = SessionDriver::new(connector, session_options());
    let mut action = CommandAction::new(
        vec!["sh".to_string(), "-c".to_string(), "exit 1".to_string()],
        OutputFormat::Json,
    )
    .unwrap();

    assert_eq!(driver.run(&mut action).await.unwrap(), DriverExit::Disconnected);
    assert_eq!(driver.delivered(), 2);
}
