//! `agentcore status`: show (or wait for) runtime and endpoint status.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::StatusSource;
use crate::application::services::config_service;
use crate::application::services::poll::{
    DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT, PollOutcome,
};
use crate::application::services::status::{ControlPlaneStatusSource, launched_agent};
use crate::commands::{poll_options, wait_for_terminal};
use crate::domain::DeploymentStatus;
use crate::domain::error::{DeploymentError, TimeoutError};

#[derive(Args, Clone)]
pub struct StatusArgs {
    /// Agent to inspect (defaults to the descriptor's default agent)
    #[arg(short, long)]
    pub agent: Option<String>,

    /// Poll until both runtime and endpoint reach a terminal state
    #[arg(long)]
    pub wait: bool,

    /// Give up waiting after this many seconds
    #[arg(long, default_value_t = DEFAULT_POLL_TIMEOUT.as_secs(), requires = "wait")]
    pub timeout: u64,

    /// Seconds between status checks
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_secs(), requires = "wait")]
    pub interval: u64,
}

/// Run the status command.
pub async fn run(app: &AppContext, args: StatusArgs) -> Result<ExitCode> {
    config_service::load_config(&app.config_store)?;
    let agent = launched_agent(&app.descriptors, args.agent.as_deref())?;
    let region = app.region_or(&agent.config.region);
    let control = app.control_plane(app.aws_credentials(&region).await?, &region)?;
    let source = ControlPlaneStatusSource::new(&control);

    if !args.wait {
        let status = source.fetch_status(&agent.record).await?;
        app.renderer().render_status(&agent.name, &status, None)?;
        return Ok(exit_code(&status));
    }

    let outcome = wait_for_terminal(
        app,
        &source,
        &agent.record,
        poll_options(args.timeout, args.interval),
    )
    .await;
    match outcome {
        PollOutcome::Settled(status) => {
            if !(status.is_failed() && app.is_json()) {
                app.renderer().render_status(&agent.name, &status, None)?;
            }
            settled_result(&status)?;
            Ok(ExitCode::SUCCESS)
        }
        PollOutcome::TimedOut { last, elapsed } => {
            if !app.is_json() {
                app.renderer()
                    .render_status(&agent.name, &last, Some(elapsed))?;
            }
            Err(TimeoutError {
                elapsed,
                agent: last.agent.status,
                endpoint: last.endpoint.status,
            }
            .into())
        }
    }
}

/// A settled deployment either became ready or failed.
pub(crate) fn settled_result(status: &DeploymentStatus) -> Result<(), DeploymentError> {
    if status.is_failed() {
        return Err(DeploymentError::Failed {
            agent: status.agent.status,
            endpoint: status.endpoint.status,
        });
    }
    Ok(())
}

fn exit_code(status: &DeploymentStatus) -> ExitCode {
    if status.is_failed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
