//! `agentcore auth`: authenticate the configured test user.

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::services::{auth, config_service};
use crate::domain::error::AuthError;

/// Auth subcommands.
#[derive(Subcommand)]
pub enum AuthCommand {
    /// Log the test user in and report the token lifetime
    Login {
        /// Print the access token
        #[arg(long)]
        show_token: bool,
    },
}

/// Run the auth command.
pub async fn run(app: &AppContext, cmd: AuthCommand) -> Result<ExitCode> {
    match cmd {
        AuthCommand::Login { show_token } => login(app, show_token).await,
    }
}

async fn login(app: &AppContext, show_token: bool) -> Result<ExitCode> {
    let config = config_service::load_config(&app.config_store)?;
    let username = config.test_username().ok_or(AuthError::MissingUser)?;
    let password = app.test_password(username)?;
    let provider = app.token_provider(&config.region)?;
    let tokens = auth::authenticate(&provider, &config, &password).await?;
    app.renderer()
        .render_tokens(username, &tokens, show_token)?;
    Ok(ExitCode::SUCCESS)
}
