//! `agentcore deploy`: configure, launch, wait for a terminal state and verify.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::config_service;
use crate::application::services::poll::{DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT};
use crate::application::services::status::{ControlPlaneStatusSource, launched_agent};
use crate::application::services::verify::require_reachable;
use crate::commands::configure::{ConfigureArgs, configure_agent};
use crate::commands::launch::launch_agent;
use crate::commands::status::settled_result;
use crate::commands::verify::{endpoint_url, probe_agent};
use crate::commands::{poll_options, wait_for_terminal};

#[derive(Args, Clone)]
pub struct DeployArgs {
    #[command(flatten)]
    pub configure: ConfigureArgs,

    /// Update an existing runtime with the same name instead of failing
    #[arg(long)]
    pub auto_update_on_conflict: bool,

    /// Give up waiting after this many seconds
    #[arg(long, default_value_t = DEFAULT_POLL_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// Seconds between status checks
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
    pub interval: u64,

    /// Stop once the deployment is ready, without probing the endpoint
    #[arg(long)]
    pub skip_verify: bool,
}

/// Run the full deployment pipeline.
pub async fn run(app: &AppContext, args: DeployArgs) -> Result<ExitCode> {
    let config = config_service::load_config(&app.config_store)?;
    if let Some(warning) = config_service::discovery_mismatch(&config) {
        app.output.warn(&warning);
    }

    app.output.header("Configure");
    let handle = configure_agent(app, &config, args.configure).await?;

    app.output.header("Launch");
    let launch = launch_agent(
        app,
        Some(handle.agent_name.as_str()),
        args.auto_update_on_conflict,
    )
    .await?;

    app.output.header("Status");
    let agent = launched_agent(&app.descriptors, Some(handle.agent_name.as_str()))?;
    let region = app.region_or(&agent.config.region);
    let control = app.control_plane(app.aws_credentials(&region).await?, &region)?;
    let source = ControlPlaneStatusSource::new(&control);
    let status = wait_for_terminal(
        app,
        &source,
        &agent.record,
        poll_options(args.timeout, args.interval),
    )
    .await
    .into_settled()?;
    settled_result(&status)?;

    let connectivity = if args.skip_verify {
        None
    } else {
        app.output.header("Verify");
        let url = status
            .endpoint
            .url
            .clone()
            .unwrap_or_else(|| endpoint_url(app, &agent));
        let report = probe_agent(app, &config, &agent, &url, None).await?;
        require_reachable(&report)?;
        Some(report)
    };

    app.renderer()
        .render_deploy(&launch, &status, connectivity.as_ref())?;
    Ok(ExitCode::SUCCESS)
}
