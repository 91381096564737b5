//! Application service: test-user authentication.

use anyhow::Result;

use crate::application::ports::TokenProvider;
use crate::domain::CognitoTestConfig;
use crate::domain::auth::TokenSet;
use crate::domain::error::AuthError;

/// Log the configured test user in with `password`.
///
/// # Errors
///
/// Returns `AuthError::MissingUser` if the config has no test user, or
/// whatever the provider reports.
pub async fn authenticate(
    provider: &impl TokenProvider,
    config: &CognitoTestConfig,
    password: &str,
) -> Result<TokenSet> {
    let username = config.test_username().ok_or(AuthError::MissingUser)?;
    if password.is_empty() {
        return Err(AuthError::MissingPassword.into());
    }
    tracing::debug!(username, client_id = %config.app_client.client_id, "initiating auth");
    provider.authenticate(config, username, password).await
}
