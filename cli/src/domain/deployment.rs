//! Deployment configuration, the persisted runtime descriptor, and the
//! control-plane request shape.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use agentcore_common::Protocol;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domain::authorizer::AuthorizerConfig;
use crate::domain::error::DeploymentError;

/// Name of the endpoint every runtime gets on creation.
pub const DEFAULT_ENDPOINT_NAME: &str = "DEFAULT";

/// File name of the descriptor written by `configure`.
pub const DESCRIPTOR_FILE: &str = ".agentcore.yaml";

/// Dockerfile name looked up in, or written to, the build context.
pub const DOCKERFILE: &str = "Dockerfile";

/// Base image of generated Dockerfiles. Runtimes run on arm64.
const PYTHON_BASE_IMAGE: &str = "public.ecr.aws/docker/library/python:3.12-slim";

/// Runtime names accepted by the control plane.
pub static AGENT_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]{0,47}$").expect("valid regex")
});

static ROLE_ARN_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^arn:aws[a-z-]*:iam::\d{12}:role/[\w+=,.@/-]+$").expect("valid regex")
});

/// Unreserved characters stay literal when an ARN becomes a path segment.
const ARN_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

// ── Deployment config ────────────────────────────────────────────────────────

/// Where the runtime's container image comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContainerSource {
    /// A pre-built image already pushed to a registry.
    Image { uri: String },
    /// Build from the entrypoint's directory and push to this repository.
    Build {
        repository: String,
        /// Create the repository during `configure` if it does not exist.
        #[serde(default)]
        auto_create: bool,
        /// Resolved repository URI, filled in by `configure`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        repository_uri: Option<String>,
    },
}

/// Everything needed to create or update one runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub agent_name: String,
    pub entrypoint: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<PathBuf>,
    pub region: String,
    #[serde(default)]
    pub protocol: Protocol,
    pub execution_role_arn: String,
    pub container: ContainerSource,
    pub authorizer: AuthorizerConfig,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

/// Validates a runtime name.
///
/// # Errors
///
/// Returns [`DeploymentError::InvalidName`] if the name does not match
/// `^[a-zA-Z][a-zA-Z0-9_]{0,47}$`.
pub fn validate_agent_name(name: &str) -> Result<(), DeploymentError> {
    if AGENT_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(DeploymentError::InvalidName(name.to_string()))
    }
}

/// Validates an IAM role ARN.
///
/// # Errors
///
/// Returns [`DeploymentError::InvalidRole`] for anything that is not a role ARN.
pub fn validate_role_arn(arn: &str) -> Result<(), DeploymentError> {
    if ROLE_ARN_RE.is_match(arn) {
        Ok(())
    } else {
        Err(DeploymentError::InvalidRole(arn.to_string()))
    }
}

impl DeploymentConfig {
    /// Shape checks that need no I/O (entrypoint existence is checked by the
    /// configurator).
    ///
    /// # Errors
    ///
    /// Returns the first [`DeploymentError`] found.
    pub fn validate(&self) -> Result<(), DeploymentError> {
        validate_agent_name(&self.agent_name)?;
        validate_role_arn(&self.execution_role_arn)?;
        self.authorizer.validate()?;
        match &self.container {
            ContainerSource::Image { uri } if uri.trim().is_empty() => Err(
                DeploymentError::BuildFailed("container image URI is empty".to_string()),
            ),
            ContainerSource::Build { repository, .. } if repository.trim().is_empty() => Err(
                DeploymentError::BuildFailed("repository name is empty".to_string()),
            ),
            _ => Ok(()),
        }
    }

    /// Directory used as the container build context.
    #[must_use]
    pub fn build_context(&self) -> PathBuf {
        match self.entrypoint.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Where `docker build` expects the Dockerfile.
    #[must_use]
    pub fn dockerfile_path(&self) -> PathBuf {
        self.build_context().join(DOCKERFILE)
    }

    /// `path` relative to the build context, if it lies inside it.
    fn context_relative(&self, path: &Path) -> Option<PathBuf> {
        let context = self.build_context();
        let relative = if context == Path::new(".") {
            path
        } else {
            path.strip_prefix(&context).ok()?
        };
        let inside = relative.is_relative()
            && !relative
                .components()
                .any(|c| matches!(c, Component::ParentDir));
        inside.then(|| relative.to_path_buf())
    }

    /// Dockerfile that installs `requirements` (when given) and runs the
    /// entrypoint as a module.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError::RequirementsOutsideContext`] if the
    /// requirements file cannot be copied from the build context, and
    /// [`DeploymentError::EntrypointMissing`] if the entrypoint has no file name.
    pub fn render_dockerfile(&self, requirements: Option<&Path>) -> Result<String, DeploymentError> {
        let module = self
            .entrypoint
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| DeploymentError::EntrypointMissing(self.entrypoint.display().to_string()))?;
        let port = match self.protocol {
            Protocol::Http => 8080,
            Protocol::Mcp => 8000,
        };

        let mut dockerfile = format!("FROM --platform=linux/arm64 {PYTHON_BASE_IMAGE}\nWORKDIR /app\n\n");
        if let Some(req) = requirements {
            let relative = self.context_relative(req).ok_or_else(|| {
                DeploymentError::RequirementsOutsideContext {
                    path: req.display().to_string(),
                    context: self.build_context().display().to_string(),
                }
            })?;
            dockerfile.push_str(&format!(
                "COPY {} requirements.txt\nRUN pip install --no-cache-dir -r requirements.txt\n\n",
                relative.display()
            ));
        }
        dockerfile.push_str(&format!(
            "COPY . .\n\nEXPOSE {port}\nCMD [\"python\", \"-m\", \"{module}\"]\n"
        ));
        Ok(dockerfile)
    }
}

/// Image tag pushed by a build: `<repository_uri>:latest`.
#[must_use]
pub fn image_tag(repository_uri: &str) -> String {
    format!("{repository_uri}:latest")
}

// ── Control-plane request ────────────────────────────────────────────────────

/// A create/update runtime request with the image resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeRequest {
    pub name: String,
    pub container_uri: String,
    pub role_arn: String,
    pub protocol: Protocol,
    pub authorizer: AuthorizerConfig,
    pub environment: BTreeMap<String, String>,
}

impl RuntimeRequest {
    #[must_use]
    pub fn new(config: &DeploymentConfig, container_uri: String) -> Self {
        Self {
            name: config.agent_name.clone(),
            container_uri,
            role_arn: config.execution_role_arn.clone(),
            protocol: config.protocol,
            authorizer: config.authorizer.clone(),
            environment: config.environment.clone(),
        }
    }

    /// Body shared by create and update. Create adds `agentRuntimeName`.
    #[must_use]
    pub fn to_wire(&self, include_name: bool) -> Value {
        let mut body = json!({
            "agentRuntimeArtifact": {
                "containerConfiguration": { "containerUri": self.container_uri }
            },
            "roleArn": self.role_arn,
            "networkConfiguration": { "networkMode": "PUBLIC" },
            "protocolConfiguration": { "serverProtocol": self.protocol.as_str() },
            "authorizerConfiguration": self.authorizer.to_wire(),
        });
        if let Some(obj) = body.as_object_mut() {
            if include_name {
                obj.insert("agentRuntimeName".to_string(), json!(self.name));
            }
            if !self.environment.is_empty() {
                obj.insert("environmentVariables".to_string(), json!(self.environment));
            }
        }
        body
    }
}

// ── Descriptor ───────────────────────────────────────────────────────────────

/// Identity of a runtime on the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeRecord {
    pub runtime_id: String,
    pub runtime_arn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// One configured agent in the descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentEntry {
    #[serde(flatten)]
    pub config: DeploymentConfig,
    /// Set once a launch succeeds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RuntimeRecord>,
}

/// Contents of `.agentcore.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RuntimeDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_agent: Option<String>,
    #[serde(default)]
    pub agents: BTreeMap<String, AgentEntry>,
}

impl RuntimeDescriptor {
    /// Insert or replace an agent's configuration and make it the default.
    ///
    /// A runtime already recorded for the agent is kept so the next launch
    /// updates it instead of creating a duplicate.
    pub fn upsert(&mut self, config: DeploymentConfig) {
        let name = config.agent_name.clone();
        let runtime = self.agents.remove(&name).and_then(|e| e.runtime);
        self.agents.insert(name.clone(), AgentEntry { config, runtime });
        self.default_agent = Some(name);
    }

    /// Resolve `--agent` (or the default agent) to a configured entry.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError::NoAgentSelected`] or
    /// [`DeploymentError::NotConfigured`].
    pub fn resolve(&self, agent: Option<&str>) -> Result<&AgentEntry, DeploymentError> {
        let name = agent
            .or(self.default_agent.as_deref())
            .ok_or(DeploymentError::NoAgentSelected)?;
        self.agents
            .get(name)
            .ok_or_else(|| DeploymentError::NotConfigured(name.to_string()))
    }

    /// Record the runtime a launch created or updated.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError::NotConfigured`] if the agent is unknown.
    pub fn record_runtime(
        &mut self,
        agent: &str,
        record: RuntimeRecord,
    ) -> Result<(), DeploymentError> {
        let entry = self
            .agents
            .get_mut(agent)
            .ok_or_else(|| DeploymentError::NotConfigured(agent.to_string()))?;
        entry.runtime = Some(record);
        Ok(())
    }
}

/// Returned by the configurator; names the descriptor entry to launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationHandle {
    pub descriptor_path: PathBuf,
    pub agent_name: String,
}

/// Returned by the launcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchResult {
    pub agent_name: String,
    pub runtime_id: String,
    pub runtime_arn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// An existing runtime was updated rather than a new one created.
    pub updated_existing: bool,
}

/// Data-plane invocation URL for a runtime ARN.
///
/// The ARN is a single path segment, so `:` and `/` are percent-encoded.
#[must_use]
pub fn invocation_url(data_plane_base: &str, runtime_arn: &str) -> String {
    let escaped = utf8_percent_encode(runtime_arn, ARN_SEGMENT);
    format!(
        "{}/runtimes/{escaped}/invocations?qualifier={DEFAULT_ENDPOINT_NAME}",
        data_plane_base.trim_end_matches('/')
    )
}
