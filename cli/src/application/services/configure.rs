//! Application service: deployment configurator.
//!
//! Validates a deployment, provisions the container repository when asked to,
//! and records the result in the runtime descriptor.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::{ContainerRegistry, DescriptorStore, LocalFs, ProgressReporter};
use crate::domain::deployment::{ConfigurationHandle, ContainerSource, DeploymentConfig};
use crate::domain::error::{ConfigError, DeploymentError};
use crate::domain::{AuthorizerConfig, CognitoTestConfig, Protocol};

/// Caller-supplied settings for one agent.
#[derive(Debug, Clone)]
pub struct ConfigureRequest {
    pub agent_name: String,
    pub entrypoint: PathBuf,
    pub requirements: Option<PathBuf>,
    /// Falls back to the config file's region.
    pub region: Option<String>,
    pub protocol: Protocol,
    pub execution_role_arn: String,
    pub container: ContainerSource,
    /// Falls back to a JWT authorizer built from the config file.
    pub authorizer: Option<AuthorizerConfig>,
    pub environment: BTreeMap<String, String>,
}

/// Combine the request with the loaded identity-provider config.
#[must_use]
pub fn build_deployment_config(
    config: &CognitoTestConfig,
    request: ConfigureRequest,
) -> DeploymentConfig {
    DeploymentConfig {
        agent_name: request.agent_name,
        entrypoint: request.entrypoint,
        requirements: request.requirements,
        region: request.region.unwrap_or_else(|| config.region.clone()),
        protocol: request.protocol,
        execution_role_arn: request.execution_role_arn,
        container: request.container,
        authorizer: request
            .authorizer
            .unwrap_or_else(|| AuthorizerConfig::jwt_from_config(config)),
        environment: request.environment,
    }
}

/// Register a deployment in the descriptor.
///
/// Build sources get a generated Dockerfile in the build context unless one
/// already exists there; `registry` is only used for them.
///
/// # Errors
///
/// Returns a `DeploymentError` for invalid input (nothing is persisted) and
/// `ConfigError::RemoteRejected` if the registry refuses to provision the
/// repository.
pub async fn configure(
    mut config: DeploymentConfig,
    store: &impl DescriptorStore,
    registry: Option<&impl ContainerRegistry>,
    fs: &impl LocalFs,
    reporter: &impl ProgressReporter,
) -> Result<ConfigurationHandle> {
    config.validate()?;
    if !fs.is_file(&config.entrypoint) {
        return Err(
            DeploymentError::EntrypointMissing(config.entrypoint.display().to_string()).into(),
        );
    }
    let requirements = match &config.requirements {
        Some(req) if fs.is_file(req) => Some(req.as_path()),
        Some(req) => {
            reporter.warn(&format!("requirements file not found: {}", req.display()));
            None
        }
        None => None,
    };

    let builds = matches!(config.container, ContainerSource::Build { .. });
    let dockerfile_path = config.dockerfile_path();
    let dockerfile = if builds && !fs.is_file(&dockerfile_path) {
        Some(config.render_dockerfile(requirements)?)
    } else {
        None
    };

    if let ContainerSource::Build {
        repository,
        auto_create,
        repository_uri,
    } = &mut config.container
    {
        let registry = registry.context("a container registry client is required to build")?;
        let uri = if *auto_create {
            reporter.step(&format!("ensuring repository '{repository}'..."));
            registry
                .ensure_repository(repository)
                .await
                .map_err(|e| ConfigError::RemoteRejected(format!("{e:#}")))?
        } else {
            registry
                .describe_repository(repository)
                .await
                .map_err(|e| ConfigError::RemoteRejected(format!("{e:#}")))?
                .ok_or_else(|| {
                    ConfigError::RemoteRejected(format!(
                        "repository '{repository}' does not exist; re-run without --no-create-ecr"
                    ))
                })?
        };
        *repository_uri = Some(uri);
    }

    match dockerfile {
        Some(content) => {
            fs.write_file(&dockerfile_path, &content)?;
            reporter.step(&format!("generated {}", dockerfile_path.display()));
        }
        None if builds => {
            reporter.step(&format!("using existing {}", dockerfile_path.display()));
        }
        None => {}
    }

    let agent_name = config.agent_name.clone();
    let mut descriptor = store.load().context("loading runtime descriptor")?;
    descriptor.upsert(config);
    store.save(&descriptor).context("saving runtime descriptor")?;
    reporter.success(&format!("agent '{agent_name}' configured"));

    Ok(ConfigurationHandle {
        descriptor_path: store.path(),
        agent_name,
    })
}
