//! Deployment launcher tests.

#![allow(clippy::expect_used)]

use std::path::PathBuf;

use agentcore_cli::application::services::launch::{LaunchOptions, launch};
use agentcore_cli::domain::error::DeploymentError;
use agentcore_cli::domain::{ConfigurationHandle, ContainerSource, RuntimeDescriptor};

use crate::mocks::{
    MemoryDescriptorStore, MockControlPlane, MockRegistry, RecordingReporter, RecordingRunner,
    deployment, image_source, record,
};

const REPO_URI: &str = "123456789012.dkr.ecr.us-east-1.amazonaws.com/bedrock-agentcore-restaurant";

fn handle() -> ConfigurationHandle {
    ConfigurationHandle {
        descriptor_path: PathBuf::from(".agentcore.yaml"),
        agent_name: "restaurant_agent".to_string(),
    }
}

fn store_with(container: ContainerSource) -> MemoryDescriptorStore {
    let mut descriptor = RuntimeDescriptor::default();
    descriptor.upsert(deployment("restaurant_agent", container));
    MemoryDescriptorStore::with(descriptor)
}

fn built_source() -> ContainerSource {
    ContainerSource::Build {
        repository: "bedrock-agentcore-restaurant".to_string(),
        auto_create: true,
        repository_uri: Some(REPO_URI.to_string()),
    }
}

#[tokio::test]
async fn test_first_launch_creates_and_records_runtime() {
    let store = store_with(image_source());
    let control = MockControlPlane::creating(record("rt-1"));
    let runner = RecordingRunner::default();

    let result = launch(
        &handle(),
        LaunchOptions::default(),
        &store,
        &control,
        &MockRegistry::default(),
        &runner,
        &RecordingReporter::default(),
    )
    .await
    .expect("launch");

    assert_eq!(result.runtime_id, "rt-1");
    assert!(!result.updated_existing);
    assert_eq!(control.calls(), vec!["create:restaurant_agent"]);
    assert!(runner.calls().is_empty(), "image source must not build");
    let entry = store.snapshot().agents["restaurant_agent"].clone();
    assert_eq!(entry.runtime, Some(record("rt-1")));
}

#[tokio::test]
async fn test_relaunch_updates_recorded_runtime() {
    let mut descriptor = RuntimeDescriptor::default();
    descriptor.upsert(deployment("restaurant_agent", image_source()));
    descriptor
        .record_runtime("restaurant_agent", record("rt-1"))
        .expect("record");
    let store = MemoryDescriptorStore::with(descriptor);
    let control = MockControlPlane::creating(record("unused"));

    let result = launch(
        &handle(),
        LaunchOptions::default(),
        &store,
        &control,
        &MockRegistry::default(),
        &RecordingRunner::default(),
        &RecordingReporter::default(),
    )
    .await
    .expect("launch");

    assert!(result.updated_existing);
    assert_eq!(result.version.as_deref(), Some("2"));
    assert_eq!(control.calls(), vec!["update:rt-1"]);
}

#[tokio::test]
async fn test_conflict_without_override_fails() {
    let store = store_with(image_source());
    let control = MockControlPlane::conflicting(Some(record("rt-9")));

    let err = launch(
        &handle(),
        LaunchOptions::default(),
        &store,
        &control,
        &MockRegistry::default(),
        &RecordingRunner::default(),
        &RecordingReporter::default(),
    )
    .await
    .expect_err("conflict");

    assert!(matches!(
        err.downcast_ref::<DeploymentError>(),
        Some(DeploymentError::Conflict(name)) if name == "restaurant_agent"
    ));
    assert_eq!(control.calls(), vec!["create:restaurant_agent"]);
    assert_eq!(store.save_count(), 0);
}

#[tokio::test]
async fn test_conflict_with_override_updates_existing() {
    let store = store_with(image_source());
    let control = MockControlPlane::conflicting(Some(record("rt-9")));
    let reporter = RecordingReporter::default();

    let result = launch(
        &handle(),
        LaunchOptions {
            allow_conflict_override: true,
        },
        &store,
        &control,
        &MockRegistry::default(),
        &RecordingRunner::default(),
        &reporter,
    )
    .await
    .expect("launch");

    assert!(result.updated_existing);
    assert_eq!(result.runtime_id, "rt-9");
    assert_eq!(
        control.calls(),
        vec!["create:restaurant_agent", "find:restaurant_agent", "update:rt-9"]
    );
    assert!(reporter.events().iter().any(|e| e.starts_with("warn:")));
    let entry = store.snapshot().agents["restaurant_agent"].clone();
    assert_eq!(entry.runtime.map(|r| r.runtime_id).as_deref(), Some("rt-9"));
}

#[tokio::test]
async fn test_conflict_override_with_vanished_runtime_is_rejected() {
    let control = MockControlPlane::conflicting(None);

    let err = launch(
        &handle(),
        LaunchOptions {
            allow_conflict_override: true,
        },
        &store_with(image_source()),
        &control,
        &MockRegistry::default(),
        &RecordingRunner::default(),
        &RecordingReporter::default(),
    )
    .await
    .expect_err("vanished");

    assert!(matches!(
        err.downcast_ref::<DeploymentError>(),
        Some(DeploymentError::LaunchRejected(_))
    ));
}

#[tokio::test]
async fn test_control_plane_error_is_launch_rejected() {
    let control = MockControlPlane::with_create(Err(anyhow::anyhow!(
        "ValidationException: roleArn is invalid"
    )));

    let err = launch(
        &handle(),
        LaunchOptions::default(),
        &store_with(image_source()),
        &control,
        &MockRegistry::default(),
        &RecordingRunner::default(),
        &RecordingReporter::default(),
    )
    .await
    .expect_err("rejected");

    match err.downcast_ref::<DeploymentError>() {
        Some(DeploymentError::LaunchRejected(msg)) => assert!(msg.contains("roleArn")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_build_source_logs_in_builds_and_pushes() {
    let runner = RecordingRunner::default();
    let registry = MockRegistry::default();
    let control = MockControlPlane::creating(record("rt-1"));

    launch(
        &handle(),
        LaunchOptions::default(),
        &store_with(built_source()),
        &control,
        &registry,
        &runner,
        &RecordingReporter::default(),
    )
    .await
    .expect("launch");

    let calls = runner.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls[0].starts_with("docker login --username AWS --password-stdin"));
    assert_eq!(
        calls[1],
        format!("docker build --platform linux/arm64 -t {REPO_URI}:latest agent")
    );
    assert_eq!(calls[2], format!("docker push {REPO_URI}:latest"));
    assert_eq!(runner.stdin.lock().expect("lock")[0], b"token".to_vec());
    assert_eq!(registry.calls(), vec!["login"]);
}

#[tokio::test]
async fn test_build_failure_stops_before_control_plane() {
    let runner = RecordingRunner {
        fail_on: Some("build"),
        ..RecordingRunner::default()
    };
    let control = MockControlPlane::creating(record("rt-1"));

    let err = launch(
        &handle(),
        LaunchOptions::default(),
        &store_with(built_source()),
        &control,
        &MockRegistry::default(),
        &runner,
        &RecordingReporter::default(),
    )
    .await
    .expect_err("build fails");

    match err.downcast_ref::<DeploymentError>() {
        Some(DeploymentError::BuildFailed(msg)) => assert!(msg.contains("no space left")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(control.calls().is_empty());
    assert_eq!(runner.calls().len(), 2, "push must not run after a failed build");
}

#[tokio::test]
async fn test_unknown_agent_is_not_configured() {
    let err = launch(
        &ConfigurationHandle {
            descriptor_path: PathBuf::from(".agentcore.yaml"),
            agent_name: "ghost".to_string(),
        },
        LaunchOptions::default(),
        &store_with(image_source()),
        &MockControlPlane::creating(record("rt-1")),
        &MockRegistry::default(),
        &RecordingRunner::default(),
        &RecordingReporter::default(),
    )
    .await
    .expect_err("not configured");

    assert!(matches!(
        err.downcast_ref::<DeploymentError>(),
        Some(DeploymentError::NotConfigured(name)) if name == "ghost"
    ));
}
