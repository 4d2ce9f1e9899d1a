//! Exit codes and output of the `conduit` binary.

use std::process::{Command, Output};

use conduit_test::{DataDirFixture, orders_config, orders_manifest};
use serde_json::json;

fn run_conduit(fixture: &DataDirFixture, envs: &[(&str, &str)]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_conduit"))
        .env("KBC_DATADIR", fixture.env_value())
        .env("CONDUIT_LOG", "debug")
        .env_remove("CONDUIT_LOG_FORMAT")
        .envs(envs.iter().copied())
        .output()
        .expect("failed to run conduit")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_success() {
    let fixture = DataDirFixture::new()
        .with_config(&orders_config())
        .with_input_table("orders.csv", "id,amount\n1,10\n", &orders_manifest());

    let output = run_conduit(&fixture, &[]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(output.stdout.is_empty());

    let log = stderr(&output);
    assert!(log.contains("out.c-shop.orders"));
    assert!(log.contains("component finished"));
}

#[test]
fn test_missing_config_is_user_error() {
    let fixture = DataDirFixture::new();

    let output = run_conduit(&fixture, &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("error: failed to read config file"));
}

#[test]
fn test_invalid_config_is_user_error() {
    let fixture = DataDirFixture::new().with_config(&json!({"parameters": "orders"}));

    let output = run_conduit(&fixture, &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("invalid configuration at 'parameters' (type-mismatch)"));
}

#[test]
fn test_unsupported_action_is_user_error() {
    let fixture =
        DataDirFixture::new().with_config(&json!({"parameters": {}, "action": "getTables"}));

    let output = run_conduit(&fixture, &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("action 'getTables' is not supported"));
}

#[test]
fn test_corrupt_manifest_is_application_error() {
    let fixture = DataDirFixture::new().with_config(&json!({"parameters": {}}));
    fixture.write_file("in/tables/orders.csv.manifest", "not json");

    let output = run_conduit(&fixture, &[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("failed to decode manifest"));
}

#[test]
fn test_bad_log_format_is_application_error() {
    let fixture = DataDirFixture::new().with_config(&json!({"parameters": {}}));

    let output = run_conduit(&fixture, &[("CONDUIT_LOG_FORMAT", "xml")]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("error: failed to set up logging"));
}

#[test]
fn test_json_logs() {
    let fixture = DataDirFixture::new().with_config(&json!({"parameters": {"limit": 5}}));

    let output = run_conduit(&fixture, &[("CONDUIT_LOG_FORMAT", "json")]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let log = stderr(&output);
    let first = log.lines().next().unwrap();
    let event: serde_json::Value = serde_json::from_str(first).unwrap();
    assert!(event.get("level").is_some());
}
