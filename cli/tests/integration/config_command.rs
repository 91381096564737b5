//! Integration tests for `agentcore config`.

#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

const CONFIG: &str = r#"{
    "user_pool": {"user_pool_id": "us-east-1_AbC123"},
    "app_client": {"client_id": "abc123", "client_secret": "s3cr3t-value"},
    "region": "us-east-1",
    "test_user": {"username": "tester"},
    "discovery_url": "https://cognito-idp.us-east-1.amazonaws.com/us-east-1_AbC123/.well-known/openid-configuration"
}"#;

fn agentcore() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("agentcore"));
    cmd.env("NO_COLOR", "1").env_remove("AGENTCORE_CONFIG");
    cmd
}

fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join("cognito_config.json");
    std::fs::write(&path, CONFIG).expect("write config");
    path
}

#[test]
fn test_config_show_masks_secret() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(dir.path());

    agentcore()
        .args(["config", "show", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("us-east-1_AbC123"))
        .stdout(predicate::str::contains("abc123"))
        .stdout(predicate::str::contains("s3cr3t-value").not());
}

#[test]
fn test_config_show_json_redacts_secret() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(dir.path());

    let output = agentcore()
        .args(["config", "show", "--json", "--config"])
        .arg(&path)
        .output()
        .expect("run");

    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(v["config"]["app_client"]["client_id"], "abc123");
    assert_eq!(v["config"]["app_client"]["client_secret"], "********");
}

#[test]
fn test_config_show_reads_env_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(dir.path());

    agentcore()
        .env("AGENTCORE_CONFIG", &path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("us-east-1_AbC123"));
}

#[test]
fn test_config_show_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");

    agentcore()
        .args(["config", "show", "--config"])
        .arg(dir.path().join("absent.json"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("absent.json"));
}

#[test]
fn test_config_show_missing_file_json_code() {
    let dir = tempfile::tempdir().expect("tempdir");

    let output = agentcore()
        .args(["config", "show", "--json", "--config"])
        .arg(dir.path().join("absent.json"))
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(1));
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(v["code"], "config_not_found");
}

#[test]
fn test_config_set_persists_value() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(dir.path());

    agentcore()
        .args(["config", "set", "test_user.username", "alice", "--config"])
        .arg(&path)
        .assert()
        .success();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("json");
    assert_eq!(raw["test_user"]["username"], "alice");
    assert_eq!(raw["app_client"]["client_secret"], "s3cr3t-value");
}

#[test]
fn test_config_set_unknown_key_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(dir.path());

    let output = agentcore()
        .args(["config", "set", "app_client.client_secret", "x", "--json", "--config"])
        .arg(&path)
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(1));
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(v["code"], "config_invalid");
    assert_eq!(std::fs::read_to_string(&path).expect("read"), CONFIG);
}
