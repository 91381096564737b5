//! Integration tests for argument parsing, help and error reporting.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn agentcore() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("agentcore"));
    cmd.env("NO_COLOR", "1")
        .env_remove("AGENTCORE_CONFIG")
        .env_remove("AWS_REGION")
        .env_remove("RUST_LOG");
    cmd
}

// --- Help and version ---

#[test]
fn test_cli_no_args_shows_help() {
    // A set NO_COLOR counts as a provided argument and suppresses the help.
    agentcore()
        .env_remove("NO_COLOR")
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "Deploy, verify and smoke-test JWT-protected agent runtimes",
        ));
}

#[test]
fn test_no_color_env_accepts_conventional_values() {
    for value in ["1", "true", "anything"] {
        agentcore()
            .env("NO_COLOR", value)
            .arg("version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }
}

#[test]
fn test_help_lists_lifecycle_commands() {
    let output = agentcore().arg("--help").output().expect("run");
    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    for name in ["configure", "launch", "status", "verify", "deploy", "smoke", "auth", "config"] {
        assert!(help.contains(name), "help is missing {name}:\n{help}");
    }
}

#[test]
fn test_version_command_shows_version() {
    agentcore()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("agentcore 0.1.0"));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let output = agentcore()
        .args(["version", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(v["version"], "0.1.0");
}

// --- Argument validation ---

#[test]
fn test_status_timeout_requires_wait() {
    agentcore()
        .args(["status", "--timeout", "30"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--wait"));
}

#[test]
fn test_configure_image_conflicts_with_ecr() {
    agentcore()
        .args([
            "configure",
            "-n",
            "agent",
            "-e",
            "main.py",
            "--execution-role",
            "arn:aws:iam::123456789012:role/R",
            "--image",
            "repo/agent:v1",
            "--ecr",
            "my-repo",
        ])
        .assert()
        .code(2);
}

#[test]
fn test_smoke_type_conflicts_with_comprehensive() {
    agentcore()
        .args(["smoke", "--type", "mbti", "--comprehensive"])
        .assert()
        .code(2);
}

// --- Smoke suites ---

#[test]
fn test_smoke_list_types_needs_no_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    agentcore()
        .current_dir(dir.path())
        .args(["smoke", "--list-types"])
        .assert()
        .success()
        .stdout(predicate::str::contains("restaurant"))
        .stdout(predicate::str::contains("mbti"))
        .stdout(predicate::str::contains("knowledge-base"));
}

#[test]
fn test_smoke_list_types_json() {
    let output = agentcore()
        .args(["smoke", "--list-types", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let names: Vec<&str> = v
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|s| s["name"].as_str())
        .collect();
    assert_eq!(names, vec!["restaurant", "mbti", "knowledge-base", "mcp"]);
}

// --- Error reporting ---

const COMPLETE_CONFIG: &str = r#"{
    "user_pool": {"user_pool_id": "us-east-1_AbC123"},
    "app_client": {"client_id": "abc123"},
    "region": "us-east-1",
    "discovery_url": "https://cognito-idp.us-east-1.amazonaws.com/us-east-1_AbC123/.well-known/openid-configuration"
}"#;

/// Temp dir holding `cognito_config.json` but no runtime descriptor.
fn dir_without_descriptor() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("cognito_config.json"), COMPLETE_CONFIG).expect("write");
    dir
}

#[test]
fn test_configure_prebuilt_image_needs_no_aws_credentials() {
    let dir = dir_without_descriptor();
    std::fs::create_dir(dir.path().join("agent")).expect("mkdir");
    std::fs::write(dir.path().join("agent/main.py"), "print('hi')\n").expect("write");

    let output = agentcore()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env("AWS_CONFIG_FILE", dir.path().join("missing-config"))
        .env("AWS_SHARED_CREDENTIALS_FILE", dir.path().join("missing-credentials"))
        .env_remove("AWS_ACCESS_KEY_ID")
        .env_remove("AWS_SECRET_ACCESS_KEY")
        .env_remove("AWS_PROFILE")
        .args([
            "configure",
            "--json",
            "--name",
            "restaurant_agent",
            "--entrypoint",
            "agent/main.py",
            "--execution-role",
            "arn:aws:iam::123456789012:role/AgentRuntimeRole",
            "--image",
            "123456789012.dkr.ecr.us-east-1.amazonaws.com/agent:v1",
        ])
        .output()
        .expect("run");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(v["agent_name"], "restaurant_agent");
    assert!(dir.path().join(".agentcore.yaml").is_file());
    assert!(!dir.path().join("agent/Dockerfile").exists());
}

#[test]
fn test_status_without_config_is_config_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = agentcore()
        .current_dir(dir.path())
        .args(["status", "--json"])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(v["code"], "config_not_found");
}

#[test]
fn test_status_without_descriptor_fails() {
    let dir = dir_without_descriptor();
    agentcore()
        .current_dir(dir.path())
        .arg("status")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_status_without_descriptor_json_error() {
    let dir = dir_without_descriptor();
    let output = agentcore()
        .current_dir(dir.path())
        .args(["status", "--json"])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(v["error"], true);
    assert_eq!(v["code"], "deployment_error");
}

#[test]
fn test_launch_with_incomplete_config_fails_before_remote_calls() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("cognito_config.json");
    std::fs::write(
        &path,
        r#"{
            "user_pool": {"user_pool_id": "us-east-1_AbC123"},
            "app_client": {"client_id": "abc123"},
            "region": "us-east-1"
        }"#,
    )
    .expect("write");

    let output = agentcore()
        .current_dir(dir.path())
        .env_remove("AWS_ACCESS_KEY_ID")
        .env("AGENTCORE_CONTROL_ENDPOINT", "http://127.0.0.1:9")
        .args(["launch", "--json", "--config"])
        .arg(&path)
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(1));
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(v["code"], "config_malformed");
    assert!(
        v["message"]
            .as_str()
            .is_some_and(|m| m.contains("discovery_url")),
        "got: {v}"
    );
}
