use serde::{Deserialize, Serialize};
use std::fmt;

/// Server protocol exposed by a deployed runtime.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Protocol {
    /// Plain HTTP invocation (`POST /invocations`).
    #[default]
    Http,
    /// Model Context Protocol server.
    Mcp,
}

impl Protocol {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "HTTP",
            Self::Mcp => "MCP",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status reported by the control plane for a runtime or endpoint.
///
/// Values the control plane may add later (e.g. `DELETING`) decode as
/// `Unknown`, which is non-terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuntimeStatus {
    Creating,
    Updating,
    Ready,
    CreateFailed,
    UpdateFailed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl RuntimeStatus {
    /// `true` for states that need operator action to change.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        match self {
            Self::Ready | Self::CreateFailed | Self::UpdateFailed => true,
            Self::Unknown | Self::Creating | Self::Updating => false,
        }
    }

    #[must_use]
    pub fn is_failed(self) -> bool {
        matches!(self, Self::CreateFailed | Self::UpdateFailed)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Creating => "CREATING",
            Self::Updating => "UPDATING",
            Self::Ready => "READY",
            Self::CreateFailed => "CREATE_FAILED",
            Self::UpdateFailed => "UPDATE_FAILED",
        }
    }
}

impl fmt::Display for RuntimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of the runtime (agent) itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AgentStatus {
    pub status: RuntimeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
}

/// Status of the runtime's externally reachable endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct EndpointStatus {
    pub status: RuntimeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
}

/// Point-in-time snapshot of a deployment. Replaced wholesale on every poll.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DeploymentStatus {
    pub agent: AgentStatus,
    pub endpoint: EndpointStatus,
}

impl DeploymentStatus {
    /// Snapshot used when the status fetch itself failed.
    #[must_use]
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Both the agent and the endpoint have reached a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.agent.status.is_terminal() && self.endpoint.status.is_terminal()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.agent.status == RuntimeStatus::Ready && self.endpoint.status == RuntimeStatus::Ready
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.agent.status.is_failed() || self.endpoint.status.is_failed()
    }
}

/// Outcome of probing a deployed endpoint.
///
/// `reachable` and `functional` are reported separately: an endpoint that
/// answers with an application-level rejection is reachable but not
/// functional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectivityReport {
    pub endpoint_url: String,
    pub reachable: bool,
    pub functional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    pub detail: String,
}
