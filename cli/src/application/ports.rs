//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::Result;
use serde_json::Value;

use crate::domain::auth::TokenSet;
use crate::domain::connectivity::ProbeOutcome;
use crate::domain::deployment::RuntimeRequest;
use crate::domain::{
    AgentStatus, CognitoTestConfig, DeploymentStatus, EndpointStatus, Protocol,
    RuntimeDescriptor, RuntimeRecord,
};

// ── Value Types ───────────────────────────────────────────────────────────────

/// Result of a create-runtime call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(RuntimeRecord),
    /// A runtime with the requested name already exists.
    Conflict(String),
}

/// Short-lived registry credentials for `docker login`.
#[derive(Clone, PartialEq, Eq)]
pub struct RegistryLogin {
    pub username: String,
    pub password: String,
    /// Registry host, e.g. `123456789012.dkr.ecr.us-east-1.amazonaws.com`.
    pub endpoint: String,
}

impl std::fmt::Debug for RegistryLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryLogin")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

// ── Local Stores ──────────────────────────────────────────────────────────────

/// Abstracts loading and saving the identity-provider config file.
pub trait ConfigStore {
    /// Load and validate the config.
    ///
    /// # Errors
    ///
    /// Fails with a `ConfigError` if the file is missing, malformed, or lacks
    /// a required key.
    fn load(&self) -> Result<CognitoTestConfig>;
    /// Rewrite the whole file.
    fn save(&self, config: &CognitoTestConfig) -> Result<()>;
    /// Resolved location of the file.
    fn path(&self) -> PathBuf;
}

/// Abstracts persistence of the runtime descriptor.
pub trait DescriptorStore {
    /// Load the descriptor, returning an empty one if none exists yet.
    fn load(&self) -> Result<RuntimeDescriptor>;
    /// Persist the descriptor.
    fn save(&self, descriptor: &RuntimeDescriptor) -> Result<()>;
    /// Resolved location of the descriptor.
    fn path(&self) -> PathBuf;
}

/// Raw local filesystem access for the configurator.
pub trait LocalFs {
    /// Whether a regular file exists at `path`.
    fn is_file(&self, path: &Path) -> bool;
    /// Create or replace the file at `path`.
    fn write_file(&self, path: &Path, content: &str) -> Result<()>;
}

// ── Remote Ports ──────────────────────────────────────────────────────────────

/// Deployment control plane: runtime lifecycle and status.
#[allow(async_fn_in_trait)]
pub trait ControlPlane {
    /// Create a runtime. A name clash is reported as `CreateOutcome::Conflict`,
    /// not as an error.
    async fn create_runtime(&self, request: &RuntimeRequest) -> Result<CreateOutcome>;
    /// Replace the definition of an existing runtime.
    async fn update_runtime(
        &self,
        runtime_id: &str,
        request: &RuntimeRequest,
    ) -> Result<RuntimeRecord>;
    /// Look up a runtime by name.
    async fn find_runtime(&self, name: &str) -> Result<Option<RuntimeRecord>>;
    /// Current status of the runtime itself.
    async fn get_runtime(&self, runtime_id: &str) -> Result<AgentStatus>;
    /// Current status of one of the runtime's endpoints.
    async fn get_endpoint(&self, runtime_id: &str, endpoint_name: &str)
    -> Result<EndpointStatus>;
    /// Base URL of the data plane that serves invocations.
    fn data_plane_base(&self) -> String;
}

/// Produces one deployment status snapshot per call.
#[allow(async_fn_in_trait)]
pub trait StatusSource {
    async fn fetch_status(&self, record: &RuntimeRecord) -> Result<DeploymentStatus>;
}

/// Container image registry.
#[allow(async_fn_in_trait)]
pub trait ContainerRegistry {
    /// Create the repository, or describe it if it already exists. Returns its URI.
    async fn ensure_repository(&self, name: &str) -> Result<String>;
    /// Describe an existing repository. Returns `None` if it does not exist.
    async fn describe_repository(&self, name: &str) -> Result<Option<String>>;
    /// Fetch credentials for pushing images.
    async fn login(&self) -> Result<RegistryLogin>;
}

/// Identity provider password login.
#[allow(async_fn_in_trait)]
pub trait TokenProvider {
    /// Exchange the test user's password for tokens.
    async fn authenticate(
        &self,
        config: &CognitoTestConfig,
        username: &str,
        password: &str,
    ) -> Result<TokenSet>;
}

/// Sends probe requests to a deployed endpoint.
#[allow(async_fn_in_trait)]
pub trait EndpointProbe {
    /// Send one request. Never fails: transport problems are reported as
    /// `ProbeOutcome::TransportFailed`.
    async fn probe(
        &self,
        url: &str,
        bearer: Option<&str>,
        protocol: Protocol,
        payload: &Value,
    ) -> ProbeOutcome;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output, killing it after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
    /// Run a program with stdin piped from `stdin`.
    async fn run_with_stdin(&self, program: &str, args: &[&str], stdin: &[u8]) -> Result<Output>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
