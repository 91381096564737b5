//! Typed error enums for configuration, authentication, deployment,
//! polling and connectivity failures.
//!
//! They travel inside `anyhow::Error`; [`error_code`] downcasts them back
//! into the stable codes printed by `--json`.

use std::time::Duration;

use agentcore_common::RuntimeStatus;
use thiserror::Error;

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to the local configuration file and remote configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}\n\nPass --config <path> or set AGENTCORE_CONFIG.")]
    NotFound { path: String },

    #[error("Configuration file {path} is not valid JSON: {reason}")]
    Malformed { path: String, reason: String },

    #[error("Configuration file {path} is missing required key '{key}'")]
    MissingKey { path: String, key: String },

    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\n{reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Control plane rejected the configuration: {0}")]
    RemoteRejected(String),
}

// ── Auth errors ───────────────────────────────────────────────────────────────

/// Errors returned while obtaining a bearer token for the test user.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication rejected ({code}): {message}")]
    Rejected { code: String, message: String },

    #[error("Test user must complete the '{0}' challenge before password login works")]
    ChallengeRequired(String),

    #[error("No password for the test user. Set AGENTCORE_TEST_PASSWORD or run interactively.")]
    MissingPassword,

    #[error("No test user in the configuration. Run: agentcore config set test_user.username <name>")]
    MissingUser,

    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

// ── Deployment errors ─────────────────────────────────────────────────────────

/// Errors related to configuring and launching a runtime.
#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error("Invalid agent name '{0}': must match ^[a-zA-Z][a-zA-Z0-9_]{{0,47}}$")]
    InvalidName(String),

    #[error("Entrypoint not found: {0}")]
    EntrypointMissing(String),

    #[error("Invalid execution role '{0}': expected arn:aws:iam::<account>:role/<name>")]
    InvalidRole(String),

    #[error("Invalid authorizer: {0}")]
    InvalidAuthorizer(String),

    #[error("Agent '{0}' is not configured. Run: agentcore configure --name {0} ...")]
    NotConfigured(String),

    #[error("No agent selected and no default agent configured. Pass --agent <name>.")]
    NoAgentSelected,

    #[error("Agent '{0}' has not been launched yet. Run: agentcore launch --agent {0}")]
    NotLaunched(String),

    #[error(
        "A runtime named '{0}' already exists. Re-run with --auto-update-on-conflict to replace it."
    )]
    Conflict(String),

    #[error("Control plane rejected the launch: {0}")]
    LaunchRejected(String),

    #[error("Container build failed: {0}")]
    BuildFailed(String),

    #[error("Requirements file {path} must be inside the build context {context}")]
    RequirementsOutsideContext { path: String, context: String },

    #[error("Deployment failed (agent: {agent}, endpoint: {endpoint})")]
    Failed {
        agent: RuntimeStatus,
        endpoint: RuntimeStatus,
    },
}

// ── Timeout ───────────────────────────────────────────────────────────────────

/// The deployment never reached a terminal state within the polling budget.
#[derive(Debug, Error)]
#[error(
    "Deployment still in progress after {}s (agent: {agent}, endpoint: {endpoint}). Check again with: agentcore status --wait",
    elapsed.as_secs()
)]
pub struct TimeoutError {
    pub elapsed: Duration,
    pub agent: RuntimeStatus,
    pub endpoint: RuntimeStatus,
}

// ── Connectivity ──────────────────────────────────────────────────────────────

/// The deployed endpoint could not be reached at the transport level.
#[derive(Debug, Error)]
#[error("Endpoint unreachable: {url}\n\nReason: {reason}")]
pub struct ConnectivityError {
    pub url: String,
    pub reason: String,
}

/// Stable machine-readable code for an error, used by `--json` output.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<ConfigError>() {
            return match e {
                ConfigError::NotFound { .. } => "config_not_found",
                ConfigError::Malformed { .. } | ConfigError::MissingKey { .. } => {
                    "config_malformed"
                }
                ConfigError::UnknownKey { .. } | ConfigError::InvalidValue { .. } => {
                    "config_invalid"
                }
                ConfigError::RemoteRejected(_) => "configuration_rejected",
            };
        }
        if cause.downcast_ref::<AuthError>().is_some() {
            return "auth_error";
        }
        if let Some(e) = cause.downcast_ref::<DeploymentError>() {
            return match e {
                DeploymentError::Conflict(_) => "deployment_conflict",
                DeploymentError::LaunchRejected(_) | DeploymentError::BuildFailed(_) => {
                    "launch_error"
                }
                _ => "deployment_error",
            };
        }
        if cause.downcast_ref::<TimeoutError>().is_some() {
            return "timeout";
        }
        if cause.downcast_ref::<ConnectivityError>().is_some() {
            return "connectivity_error";
        }
    }
    "error"
}
