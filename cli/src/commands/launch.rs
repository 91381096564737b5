//! `agentcore launch`: build the image when needed and create or update the runtime.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::DescriptorStore;
use crate::application::services::config_service;
use crate::application::services::launch::{LaunchOptions, launch};
use crate::domain::{ConfigurationHandle, LaunchResult};
use crate::infra::command_runner::TokioCommandRunner;

#[derive(Args, Clone)]
pub struct LaunchArgs {
    /// Agent to launch (defaults to the descriptor's default agent)
    #[arg(short, long)]
    pub agent: Option<String>,

    /// Update an existing runtime with the same name instead of failing
    #[arg(long)]
    pub auto_update_on_conflict: bool,
}

/// Run the launch command.
pub async fn run(app: &AppContext, args: LaunchArgs) -> Result<ExitCode> {
    config_service::load_config(&app.config_store)?;
    let result = launch_agent(app, args.agent.as_deref(), args.auto_update_on_conflict).await?;
    app.renderer().render_launch(&result)?;
    Ok(ExitCode::SUCCESS)
}

/// Shared with `deploy`.
pub(crate) async fn launch_agent(
    app: &AppContext,
    agent: Option<&str>,
    allow_conflict_override: bool,
) -> Result<LaunchResult> {
    let descriptor = app
        .descriptors
        .load()
        .context("loading runtime descriptor")?;
    let entry = descriptor.resolve(agent)?;
    let handle = ConfigurationHandle {
        descriptor_path: app.descriptors.path(),
        agent_name: entry.config.agent_name.clone(),
    };
    let region = app.region_or(&entry.config.region);
    let allow_conflict_override = allow_conflict_override
        && app.confirm(
            &format!(
                "Overwrite any existing runtime named '{}'?",
                handle.agent_name
            ),
            true,
        )?;

    let credentials = app.aws_credentials(&region).await?;
    let control = app.control_plane(credentials.clone(), &region)?;
    let registry = app.registry(credentials, &region)?;
    let runner = TokioCommandRunner::default();
    launch(
        &handle,
        LaunchOptions {
            allow_conflict_override,
        },
        &app.descriptors,
        &control,
        &registry,
        &runner,
        &app.reporter(),
    )
    .await
}
