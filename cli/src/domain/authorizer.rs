//! Authorizer descriptors gating access to a runtime endpoint.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domain::config::CognitoTestConfig;
use crate::domain::error::DeploymentError;

/// Exactly one authorizer is attached to each deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthorizerConfig {
    /// Validate bearer JWTs against an OpenID discovery document.
    Jwt {
        allowed_clients: BTreeSet<String>,
        discovery_url: String,
    },
    /// Delegate the decision to a function, caching results for `ttl_seconds`.
    Lambda { lambda_arn: String, ttl_seconds: u32 },
}

impl AuthorizerConfig {
    /// JWT authorizer built from the loaded identity-provider config.
    ///
    /// The client id and discovery URL are copied verbatim.
    #[must_use]
    pub fn jwt_from_config(config: &CognitoTestConfig) -> Self {
        Self::Jwt {
            allowed_clients: BTreeSet::from([config.app_client.client_id.clone()]),
            discovery_url: config.discovery_url.clone(),
        }
    }

    /// Whether callers must present a bearer JWT.
    #[must_use]
    pub fn expects_bearer_token(&self) -> bool {
        matches!(self, Self::Jwt { .. })
    }

    /// Check the shape before anything is sent to the control plane.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError::InvalidAuthorizer`] describing the problem.
    pub fn validate(&self) -> Result<(), DeploymentError> {
        match self {
            Self::Jwt {
                allowed_clients,
                discovery_url,
            } => {
                if allowed_clients.is_empty() || allowed_clients.iter().any(|c| c.trim().is_empty())
                {
                    return Err(DeploymentError::InvalidAuthorizer(
                        "JWT authorizer needs at least one non-empty allowed client".to_string(),
                    ));
                }
                if !discovery_url.starts_with("https://") {
                    return Err(DeploymentError::InvalidAuthorizer(format!(
                        "discovery URL must use https:// (got '{discovery_url}')"
                    )));
                }
            }
            Self::Lambda {
                lambda_arn,
                ttl_seconds,
            } => {
                if !lambda_arn.starts_with("arn:aws:lambda:") {
                    return Err(DeploymentError::InvalidAuthorizer(format!(
                        "'{lambda_arn}' is not a Lambda function ARN"
                    )));
                }
                if *ttl_seconds == 0 || *ttl_seconds > 3600 {
                    return Err(DeploymentError::InvalidAuthorizer(
                        "Lambda authorizer TTL must be between 1 and 3600 seconds".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Control-plane wire shape (`authorizerConfiguration`).
    #[must_use]
    pub fn to_wire(&self) -> Value {
        match self {
            Self::Jwt {
                allowed_clients,
                discovery_url,
            } => json!({
                "customJWTAuthorizer": {
                    "allowedClients": allowed_clients,
                    "discoveryUrl": discovery_url,
                }
            }),
            Self::Lambda {
                lambda_arn,
                ttl_seconds,
            } => json!({
                "customLambdaAuthorizer": {
                    "lambdaArn": lambda_arn,
                    "ttlSeconds": ttl_seconds,
                }
            }),
        }
    }
}
