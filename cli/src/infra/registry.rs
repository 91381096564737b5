//! Container registry client (ECR JSON-1.1 API, SigV4 service `ecr`).

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::application::ports::{ContainerRegistry, RegistryLogin};
use crate::infra::aws::{AwsErrorBody, Endpoints, SigV4Signer, send_signed};

pub const SIGNING_SERVICE: &str = "ecr";

const TARGET_PREFIX: &str = "AmazonEC2ContainerRegistry_V20150921";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Repository {
    repository_uri: String,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    repository: Repository,
}

#[derive(Debug, Deserialize)]
struct DescribeResponse {
    #[serde(default)]
    repositories: Vec<Repository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthorizationData {
    authorization_token: String,
    proxy_endpoint: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthorizationResponse {
    #[serde(default)]
    authorization_data: Vec<AuthorizationData>,
}

/// Production [`ContainerRegistry`] backed by ECR.
pub struct EcrRegistry {
    client: Client,
    signer: SigV4Signer,
    endpoint: String,
}

impl EcrRegistry {
    #[must_use]
    pub fn new(client: Client, signer: SigV4Signer, endpoints: &Endpoints) -> Self {
        Self {
            client,
            signer,
            endpoint: format!("{}/", endpoints.ecr.trim_end_matches('/')),
        }
    }

    async fn call(&self, action: &str, body: &Value) -> Result<(StatusCode, String)> {
        let target = format!("{TARGET_PREFIX}.{action}");
        send_signed(
            &self.client,
            &self.signer,
            Method::POST,
            &self.endpoint,
            &[
                ("content-type", "application/x-amz-json-1.1"),
                ("x-amz-target", target.as_str()),
            ],
            Some(body),
        )
        .await
    }
}

/// Split a base64 `user:password` token.
///
/// # Errors
///
/// Returns an error if the token is not base64 or has no `:`.
pub fn decode_authorization_token(token: &str) -> Result<(String, String)> {
    let decoded = STANDARD
        .decode(token.trim())
        .context("registry token is not valid base64")?;
    let decoded = String::from_utf8(decoded).context("registry token is not UTF-8")?;
    let (user, password) = decoded
        .split_once(':')
        .context("registry token has no user:password separator")?;
    Ok((user.to_string(), password.to_string()))
}

impl ContainerRegistry for EcrRegistry {
    async fn ensure_repository(&self, name: &str) -> Result<String> {
        let (status, text) = self
            .call("CreateRepository", &json!({ "repositoryName": name }))
            .await?;
        if status.is_success() {
            let parsed: CreateResponse =
                serde_json::from_str(&text).context("Failed to parse CreateRepository response")?;
            tracing::debug!(repository = name, "repository created");
            return Ok(parsed.repository.repository_uri);
        }
        let err = AwsErrorBody::parse(&text);
        if err.code() == "RepositoryAlreadyExistsException" {
            tracing::debug!(repository = name, "repository exists, describing");
            return self
                .describe_repository(name)
                .await?
                .with_context(|| format!("repository '{name}' exists but cannot be described"));
        }
        anyhow::bail!("CreateRepository: {}", err.describe(status))
    }

    async fn describe_repository(&self, name: &str) -> Result<Option<String>> {
        let (status, text) = self
            .call("DescribeRepositories", &json!({ "repositoryNames": [name] }))
            .await?;
        if !status.is_success() {
            let err = AwsErrorBody::parse(&text);
            if err.code() == "RepositoryNotFoundException" {
                return Ok(None);
            }
            anyhow::bail!("DescribeRepositories: {}", err.describe(status));
        }
        let parsed: DescribeResponse =
            serde_json::from_str(&text).context("Failed to parse DescribeRepositories response")?;
        Ok(parsed.repositories.into_iter().next().map(|r| r.repository_uri))
    }

    async fn login(&self) -> Result<RegistryLogin> {
        let (status, text) = self.call("GetAuthorizationToken", &json!({})).await?;
        if !status.is_success() {
            anyhow::bail!(
                "GetAuthorizationToken: {}",
                AwsErrorBody::parse(&text).describe(status)
            );
        }
        let parsed: AuthorizationResponse = serde_json::from_str(&text)
            .context("Failed to parse GetAuthorizationToken response")?;
        let data = parsed
            .authorization_data
            .into_iter()
            .next()
            .context("GetAuthorizationToken returned no authorization data")?;
        let (username, password) = decode_authorization_token(&data.authorization_token)?;
        Ok(RegistryLogin {
            username,
            password,
            endpoint: data.proxy_endpoint,
        })
    }
}
