//! Command implementations

pub mod auth;
pub mod config;
pub mod configure;
pub mod deploy;
pub mod launch;
pub mod smoke;
pub mod status;
pub mod verify;
pub mod version;

use std::time::Duration;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::StatusSource;
use crate::application::services::auth as auth_service;
use crate::application::services::poll::{PollOptions, PollOutcome, poll_until_terminal};
use crate::domain::error::AuthError;
use crate::domain::{AuthorizerConfig, CognitoTestConfig, RuntimeRecord, RuntimeStatus};
use crate::output::human::format_snapshot;
use crate::output::progress;

/// Access token for the test user when the authorizer expects one.
///
/// The identity provider is contacted in the config file's own region.
pub(crate) async fn bearer_token(
    app: &AppContext,
    config: &CognitoTestConfig,
    authorizer: &AuthorizerConfig,
) -> Result<Option<String>> {
    if !authorizer.expects_bearer_token() {
        return Ok(None);
    }
    let username = config.test_username().ok_or(AuthError::MissingUser)?;
    let password = app.test_password(username)?;
    let provider = app.token_provider(&config.region)?;
    let tokens = auth_service::authenticate(&provider, config, &password).await?;
    Ok(Some(tokens.access_token))
}

/// Poll with a spinner on a TTY, or one info line per status change otherwise.
pub(crate) async fn wait_for_terminal(
    app: &AppContext,
    source: &impl StatusSource,
    record: &RuntimeRecord,
    options: PollOptions,
) -> PollOutcome {
    let spinner = app
        .output
        .show_progress()
        .then(|| progress::spinner("Waiting for deployment"));
    let mut last_seen: Option<(RuntimeStatus, RuntimeStatus)> = None;

    let outcome = poll_until_terminal(source, record, options, |status, elapsed| {
        if let Some(pb) = &spinner {
            pb.set_message(format_snapshot(status, elapsed));
            return;
        }
        let pair = (status.agent.status, status.endpoint.status);
        if last_seen != Some(pair) {
            app.output.info(&format_snapshot(status, elapsed));
            last_seen = Some(pair);
        }
    })
    .await;

    if let Some(pb) = spinner {
        match &outcome {
            PollOutcome::Settled(s) if s.is_ready() => progress::finish_ok(&pb, "Deployment ready"),
            PollOutcome::Settled(_) => progress::finish_error(&pb, "Deployment failed"),
            PollOutcome::TimedOut { .. } => progress::finish_warn(&pb, "Still in progress"),
        }
    }
    outcome
}

pub(crate) fn poll_options(timeout_secs: u64, interval_secs: u64) -> PollOptions {
    PollOptions {
        timeout: Duration::from_secs(timeout_secs),
        interval: Duration::from_secs(interval_secs.max(1)),
    }
}
