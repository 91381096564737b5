//! Application service: deployment status lookup.

use anyhow::{Context, Result};

use crate::application::ports::{ControlPlane, DescriptorStore, StatusSource};
use crate::domain::deployment::{DEFAULT_ENDPOINT_NAME, DeploymentConfig, invocation_url};
use crate::domain::error::DeploymentError;
use crate::domain::{DeploymentStatus, RuntimeRecord};

/// [`StatusSource`] backed by the control plane.
///
/// The endpoint URL is derived from the runtime ARN when the control plane
/// does not return one.
pub struct ControlPlaneStatusSource<'a, C> {
    control: &'a C,
}

impl<'a, C: ControlPlane> ControlPlaneStatusSource<'a, C> {
    pub fn new(control: &'a C) -> Self {
        Self { control }
    }
}

impl<C: ControlPlane> StatusSource for ControlPlaneStatusSource<'_, C> {
    async fn fetch_status(&self, record: &RuntimeRecord) -> Result<DeploymentStatus> {
        let mut agent = self
            .control
            .get_runtime(&record.runtime_id)
            .await
            .context("fetching runtime status")?;
        let mut endpoint = self
            .control
            .get_endpoint(&record.runtime_id, DEFAULT_ENDPOINT_NAME)
            .await
            .context("fetching endpoint status")?;

        let arn = agent.arn.get_or_insert_with(|| record.runtime_arn.clone());
        if endpoint.url.is_none() {
            endpoint.url = Some(invocation_url(&self.control.data_plane_base(), arn));
        }
        Ok(DeploymentStatus { agent, endpoint })
    }
}

/// A configured agent that has been launched at least once.
#[derive(Debug, Clone)]
pub struct LaunchedAgent {
    pub name: String,
    pub config: DeploymentConfig,
    pub record: RuntimeRecord,
}

/// Resolve `--agent` (or the default) to a launched runtime.
///
/// # Errors
///
/// Returns `DeploymentError::NotConfigured`/`NoAgentSelected` from the
/// descriptor, or `DeploymentError::NotLaunched` if no runtime is recorded.
pub fn launched_agent(store: &impl DescriptorStore, agent: Option<&str>) -> Result<LaunchedAgent> {
    let descriptor = store.load().context("loading runtime descriptor")?;
    let entry = descriptor.resolve(agent)?;
    let name = entry.config.agent_name.clone();
    let record = entry
        .runtime
        .clone()
        .ok_or_else(|| DeploymentError::NotLaunched(name.clone()))?;
    Ok(LaunchedAgent {
        name,
        config: entry.config.clone(),
        record,
    })
}
