//! `agentcore smoke`: run prompt suites against the deployed endpoint.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::config_service;
use crate::application::services::smoke::run_suites;
use crate::application::services::status::launched_agent;
use crate::commands::bearer_token;
use crate::commands::verify::endpoint_url;
use crate::domain::Protocol;
use crate::domain::smoke::{SUITES, SmokeSuite, find_suite, suites_for};

#[derive(Args, Clone)]
pub struct SmokeArgs {
    /// Agent to test (defaults to the descriptor's default agent)
    #[arg(short, long)]
    pub agent: Option<String>,

    /// Suite to run (see --list-types)
    #[arg(short = 't', long = "type", value_name = "NAME")]
    pub suite: Option<String>,

    /// Run every suite written for the runtime's protocol
    #[arg(long, conflicts_with = "suite")]
    pub comprehensive: bool,

    /// List the available suites and exit
    #[arg(long)]
    pub list_types: bool,

    /// Probe this URL instead of the runtime's invocation URL
    #[arg(long)]
    pub url: Option<String>,
}

/// Run the smoke command. Exits 0 iff every prompt was functional.
pub async fn run(app: &AppContext, args: SmokeArgs) -> Result<ExitCode> {
    if args.list_types {
        app.renderer().render_suites(SUITES)?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = config_service::load_config(&app.config_store)?;
    let agent = launched_agent(&app.descriptors, args.agent.as_deref())?;
    let protocol = agent.config.protocol;
    let suites = select_suites(args.suite.as_deref(), args.comprehensive, protocol)?;

    let url = args.url.unwrap_or_else(|| endpoint_url(app, &agent));
    let bearer = bearer_token(app, &config, &agent.config.authorizer).await?;
    let probe = app.probe()?;
    let summary = run_suites(
        &probe,
        &url,
        bearer.as_deref(),
        protocol,
        &suites,
        &app.reporter(),
    )
    .await;

    app.renderer().render_smoke(&summary)?;
    Ok(if summary.all_functional() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// `--type` wins; `--comprehensive` takes every suite for the protocol;
/// otherwise the first suite for the protocol.
pub(crate) fn select_suites(
    name: Option<&str>,
    comprehensive: bool,
    protocol: Protocol,
) -> Result<Vec<&'static SmokeSuite>> {
    if let Some(name) = name {
        return Ok(vec![find_suite(name)?]);
    }
    let mut suites = suites_for(protocol);
    if !comprehensive {
        suites.truncate(1);
    }
    Ok(suites)
}
