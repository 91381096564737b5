//! `agentcore verify`: one authenticated probe against the deployed endpoint.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::config_service;
use crate::application::services::status::{LaunchedAgent, launched_agent};
use crate::application::services::verify::{require_reachable, verify};
use crate::commands::bearer_token;
use crate::domain::connectivity::default_prompt;
use crate::domain::deployment::invocation_url;
use crate::domain::{CognitoTestConfig, ConnectivityReport};
use crate::infra::aws::Endpoints;

#[derive(Args, Clone)]
pub struct VerifyArgs {
    /// Agent to probe (defaults to the descriptor's default agent)
    #[arg(short, long)]
    pub agent: Option<String>,

    /// Payload sent to the endpoint (default: a greeting, or tools/list for MCP)
    #[arg(long)]
    pub prompt: Option<String>,

    /// Probe this URL instead of the runtime's invocation URL
    #[arg(long)]
    pub url: Option<String>,
}

/// Run the verify command. Exits 0 iff the endpoint was reachable.
pub async fn run(app: &AppContext, args: VerifyArgs) -> Result<ExitCode> {
    let config = config_service::load_config(&app.config_store)?;
    let agent = launched_agent(&app.descriptors, args.agent.as_deref())?;
    let url = args.url.unwrap_or_else(|| endpoint_url(app, &agent));

    let report = probe_agent(app, &config, &agent, &url, args.prompt.as_deref()).await?;
    if report.reachable || !app.is_json() {
        app.renderer().render_connectivity(&report)?;
    }
    require_reachable(&report)?;
    Ok(ExitCode::SUCCESS)
}

/// Invocation URL on the data plane for the agent's region.
pub(crate) fn endpoint_url(app: &AppContext, agent: &LaunchedAgent) -> String {
    let region = app.region_or(&agent.config.region);
    invocation_url(&Endpoints::resolve(&region).data, &agent.record.runtime_arn)
}

pub(crate) async fn probe_agent(
    app: &AppContext,
    config: &CognitoTestConfig,
    agent: &LaunchedAgent,
    url: &str,
    prompt: Option<&str>,
) -> Result<ConnectivityReport> {
    let bearer = bearer_token(app, config, &agent.config.authorizer).await?;
    let probe = app.probe()?;
    let protocol = agent.config.protocol;
    let prompt = prompt.unwrap_or_else(|| default_prompt(protocol));
    app.output.info(&format!("Probing {url}"));
    Ok(verify(&probe, url, bearer.as_deref(), protocol, prompt).await)
}
