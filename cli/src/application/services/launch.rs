//! Application service: deployment launcher.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{
    CommandRunner, ContainerRegistry, ControlPlane, CreateOutcome, DescriptorStore,
    ProgressReporter,
};
use crate::domain::deployment::{
    ConfigurationHandle, ContainerSource, DeploymentConfig, LaunchResult, RuntimeRecord,
    RuntimeRequest, image_tag,
};
use crate::domain::error::DeploymentError;

/// Timeout for `docker build` and `docker push`.
pub const IMAGE_BUILD_TIMEOUT: Duration = Duration::from_secs(1800);

/// Runtimes run on Graviton hosts.
const BUILD_PLATFORM: &str = "linux/arm64";

/// Launch behaviour switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct LaunchOptions {
    /// Replace a same-named runtime instead of failing with a conflict.
    /// Destructive: the existing runtime's definition is overwritten.
    pub allow_conflict_override: bool,
}

/// Create or update the runtime for the configured agent.
///
/// # Errors
///
/// - `DeploymentError::NotConfigured` if the handle names no descriptor entry
/// - `DeploymentError::BuildFailed` if the image build or push fails
/// - `DeploymentError::Conflict` if the name is taken and override is off
/// - `DeploymentError::LaunchRejected` if the control plane refuses the request
pub async fn launch(
    handle: &ConfigurationHandle,
    options: LaunchOptions,
    store: &impl DescriptorStore,
    control: &impl ControlPlane,
    registry: &impl ContainerRegistry,
    runner: &impl CommandRunner,
    reporter: &impl ProgressReporter,
) -> Result<LaunchResult> {
    let mut descriptor = store.load().context("loading runtime descriptor")?;
    let entry = descriptor.resolve(Some(handle.agent_name.as_str()))?.clone();

    let container_uri = resolve_image(&entry.config, registry, runner, reporter).await?;
    let request = RuntimeRequest::new(&entry.config, container_uri);

    let (record, updated_existing) = match &entry.runtime {
        Some(existing) => {
            reporter.step(&format!("updating runtime {}...", existing.runtime_id));
            (update(control, &existing.runtime_id, &request).await?, true)
        }
        None => create_or_override(control, &request, options, reporter).await?,
    };

    descriptor.record_runtime(&handle.agent_name, record.clone())?;
    store.save(&descriptor).context("saving runtime descriptor")?;
    tracing::debug!(runtime_id = %record.runtime_id, updated_existing, "launch recorded");

    reporter.success(&format!(
        "runtime {} {}",
        record.runtime_id,
        if updated_existing { "updated" } else { "created" }
    ));
    Ok(LaunchResult {
        agent_name: handle.agent_name.clone(),
        runtime_id: record.runtime_id,
        runtime_arn: record.runtime_arn,
        version: record.version,
        updated_existing,
    })
}

async fn create_or_override(
    control: &impl ControlPlane,
    request: &RuntimeRequest,
    options: LaunchOptions,
    reporter: &impl ProgressReporter,
) -> Result<(RuntimeRecord, bool)> {
    reporter.step(&format!("creating runtime '{}'...", request.name));
    let outcome = control
        .create_runtime(request)
        .await
        .map_err(|e| DeploymentError::LaunchRejected(format!("{e:#}")))?;

    match outcome {
        CreateOutcome::Created(record) => Ok((record, false)),
        CreateOutcome::Conflict(_) if !options.allow_conflict_override => {
            Err(DeploymentError::Conflict(request.name.clone()).into())
        }
        CreateOutcome::Conflict(message) => {
            reporter.warn(&format!(
                "runtime '{}' already exists, replacing it",
                request.name
            ));
            tracing::debug!(%message, "create conflict, overriding");
            let existing = control
                .find_runtime(&request.name)
                .await
                .map_err(|e| DeploymentError::LaunchRejected(format!("{e:#}")))?
                .ok_or_else(|| {
                    DeploymentError::LaunchRejected(format!(
                        "runtime '{}' reported as existing but not found: {message}",
                        request.name
                    ))
                })?;
            Ok((update(control, &existing.runtime_id, request).await?, true))
        }
    }
}

async fn update(
    control: &impl ControlPlane,
    runtime_id: &str,
    request: &RuntimeRequest,
) -> Result<RuntimeRecord> {
    control
        .update_runtime(runtime_id, request)
        .await
        .map_err(|e| DeploymentError::LaunchRejected(format!("{e:#}")).into())
}

/// Image URI for the runtime, building and pushing it first when needed.
async fn resolve_image(
    config: &DeploymentConfig,
    registry: &impl ContainerRegistry,
    runner: &impl CommandRunner,
    reporter: &impl ProgressReporter,
) -> Result<String> {
    let (repository, repository_uri) = match &config.container {
        ContainerSource::Image { uri } => return Ok(uri.clone()),
        ContainerSource::Build {
            repository,
            repository_uri,
            ..
        } => (repository, repository_uri),
    };
    let repository_uri = repository_uri.as_deref().ok_or_else(|| {
        DeploymentError::BuildFailed(format!(
            "repository '{repository}' has no URI; re-run configure"
        ))
    })?;
    let tag = image_tag(repository_uri);
    let context_dir = config.build_context();
    let context_dir = context_dir.to_string_lossy();

    reporter.step("logging in to container registry...");
    let login = registry
        .login()
        .await
        .map_err(|e| DeploymentError::BuildFailed(format!("registry login: {e:#}")))?;
    let output = runner
        .run_with_stdin(
            "docker",
            &[
                "login",
                "--username",
                &login.username,
                "--password-stdin",
                &login.endpoint,
            ],
            login.password.as_bytes(),
        )
        .await
        .map_err(|e| DeploymentError::BuildFailed(format!("{e:#}")))?;
    ensure_success("docker login", &output)?;

    reporter.step(&format!("building {tag}..."));
    let output = runner
        .run_with_timeout(
            "docker",
            &[
                "build",
                "--platform",
                BUILD_PLATFORM,
                "-t",
                &tag,
                &context_dir,
            ],
            IMAGE_BUILD_TIMEOUT,
        )
        .await
        .map_err(|e| DeploymentError::BuildFailed(format!("{e:#}")))?;
    ensure_success("docker build", &output)?;

    reporter.step(&format!("pushing {tag}..."));
    let output = runner
        .run_with_timeout("docker", &["push", &tag], IMAGE_BUILD_TIMEOUT)
        .await
        .map_err(|e| DeploymentError::BuildFailed(format!("{e:#}")))?;
    ensure_success("docker push", &output)?;

    Ok(tag)
}

fn ensure_success(what: &str, output: &std::process::Output) -> Result<(), DeploymentError> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(DeploymentError::BuildFailed(format!(
        "{what} failed: {}",
        stderr.trim()
    )))
}
