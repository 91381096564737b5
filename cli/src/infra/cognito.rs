//! Identity-provider password login (`InitiateAuth`, `USER_PASSWORD_AUTH`).
//!
//! The call is unsigned: the app client id identifies the caller.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::application::ports::TokenProvider;
use crate::domain::CognitoTestConfig;
use crate::domain::auth::{TokenSet, secret_hash};
use crate::domain::error::AuthError;
use crate::infra::aws::AwsErrorBody;

const TARGET: &str = "AWSCognitoIdentityProviderService.InitiateAuth";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    access_token: String,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    expires_in: u64,
    #[serde(default)]
    token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    #[serde(default)]
    authentication_result: Option<AuthenticationResult>,
    #[serde(default)]
    challenge_name: Option<String>,
}

/// Production [`TokenProvider`].
pub struct CognitoTokenProvider {
    client: Client,
    endpoint: String,
}

impl CognitoTokenProvider {
    #[must_use]
    pub fn new(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/", endpoint.trim_end_matches('/')),
        }
    }
}

impl TokenProvider for CognitoTokenProvider {
    async fn authenticate(
        &self,
        config: &CognitoTestConfig,
        username: &str,
        password: &str,
    ) -> Result<TokenSet> {
        let mut params = BTreeMap::from([
            ("USERNAME", username.to_string()),
            ("PASSWORD", password.to_string()),
        ]);
        if let Some(secret) = &config.app_client.client_secret {
            params.insert(
                "SECRET_HASH",
                secret_hash(secret, username, &config.app_client.client_id),
            );
        }
        let body = json!({
            "AuthFlow": "USER_PASSWORD_AUTH",
            "ClientId": config.app_client.client_id,
            "AuthParameters": params,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/x-amz-json-1.1")
            .header("X-Amz-Target", TARGET)
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;
        if !status.is_success() {
            let err = AwsErrorBody::parse(&text);
            if status.is_server_error() {
                return Err(AuthError::Unavailable(err.describe(status)).into());
            }
            return Err(AuthError::Rejected {
                code: err.code().to_string(),
                message: err.message.unwrap_or_default(),
            }
            .into());
        }

        let parsed: InitiateAuthResponse =
            serde_json::from_str(&text).context("Failed to parse InitiateAuth response")?;
        if let Some(challenge) = parsed.challenge_name {
            return Err(AuthError::ChallengeRequired(challenge).into());
        }
        let result = parsed
            .authentication_result
            .ok_or_else(|| AuthError::Unavailable("no AuthenticationResult".to_string()))?;
        Ok(TokenSet {
            access_token: result.access_token,
            id_token: result.id_token,
            expires_in: result.expires_in,
            token_type: result.token_type.unwrap_or_else(|| "Bearer".to_string()),
        })
    }
}
