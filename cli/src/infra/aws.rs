//! AWS credentials, endpoint resolution, and Signature Version 4 signing.
//!
//! Credentials come from the `aws-config` provider chain; requests are signed
//! here so the REST and JSON-1.1 clients can share one `reqwest` client.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use aws_credential_types::provider::ProvideCredentials;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use url::Url;

type HmacSha256 = Hmac<Sha256>;

/// Characters left unencoded in canonical URIs and query strings.
pub const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Default timeout for control-plane and registry calls.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

// ── Credentials ──────────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Credentials {
    /// Resolve credentials through the standard AWS provider chain.
    ///
    /// Covers the environment, `~/.aws/config` and `~/.aws/credentials`
    /// profiles (`AWS_PROFILE`), SSO, `credential_process`, assume-role,
    /// web identity, and container and instance roles.
    ///
    /// # Errors
    ///
    /// Returns an error if no provider in the chain yields credentials.
    pub async fn load(region: &str) -> Result<Self> {
        let sdk = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;
        let provider = sdk
            .credentials_provider()
            .context("no AWS credentials provider configured")?;
        Self::resolve(&provider).await
    }

    /// Ask `provider` for a fresh set of credentials.
    ///
    /// # Errors
    ///
    /// Returns the provider's error with a hint on how to configure access.
    pub async fn resolve(provider: &impl ProvideCredentials) -> Result<Self> {
        let resolved = provider.provide_credentials().await.context(
            "no AWS credentials: configure a profile (aws configure) or set \
             AWS_ACCESS_KEY_ID/AWS_SECRET_ACCESS_KEY",
        )?;
        tracing::debug!(access_key_id = resolved.access_key_id(), "resolved AWS credentials");
        Ok(Self::from(&resolved))
    }
}

impl From<&aws_credential_types::Credentials> for Credentials {
    fn from(creds: &aws_credential_types::Credentials) -> Self {
        Self {
            access_key_id: creds.access_key_id().to_string(),
            secret_access_key: creds.secret_access_key().to_string(),
            session_token: creds.session_token().map(str::to_string),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

// ── Endpoints ────────────────────────────────────────────────────────────────

/// Base URLs of the remote services, one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub control: String,
    pub data: String,
    pub ecr: String,
    pub cognito: String,
}

impl Endpoints {
    /// Public AWS endpoints for `region`.
    #[must_use]
    pub fn for_region(region: &str) -> Self {
        Self {
            control: format!("https://bedrock-agentcore-control.{region}.amazonaws.com"),
            data: format!("https://bedrock-agentcore.{region}.amazonaws.com"),
            ecr: format!("https://api.ecr.{region}.amazonaws.com"),
            cognito: format!("https://cognito-idp.{region}.amazonaws.com"),
        }
    }

    /// Public endpoints with `AGENTCORE_*_ENDPOINT` overrides applied.
    #[must_use]
    pub fn resolve(region: &str) -> Self {
        let mut endpoints = Self::for_region(region);
        for (var, slot) in [
            ("AGENTCORE_CONTROL_ENDPOINT", &mut endpoints.control),
            ("AGENTCORE_DATA_ENDPOINT", &mut endpoints.data),
            ("AGENTCORE_ECR_ENDPOINT", &mut endpoints.ecr),
            ("AGENTCORE_COGNITO_ENDPOINT", &mut endpoints.cognito),
        ] {
            if let Some(value) = non_empty_var(var) {
                tracing::debug!(var, %value, "endpoint override");
                *slot = value.trim_end_matches('/').to_string();
            }
        }
        endpoints
    }
}

/// Shared HTTP client for AWS API calls.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("agentcore-cli/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")
}

/// Error body shape shared by the JSON APIs.
#[derive(Debug, Default, Deserialize)]
pub struct AwsErrorBody {
    #[serde(rename = "__type", default)]
    pub kind: Option<String>,
    #[serde(alias = "Message", default)]
    pub message: Option<String>,
}

impl AwsErrorBody {
    /// Parse an error body, tolerating non-JSON text.
    #[must_use]
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_else(|_| Self {
            kind: None,
            message: Some(body.trim().to_string()).filter(|m| !m.is_empty()),
        })
    }

    /// Exception name without the `namespace#` prefix.
    #[must_use]
    pub fn code(&self) -> &str {
        self.kind
            .as_deref()
            .map_or("UnknownError", |k| k.rsplit('#').next().unwrap_or(k))
    }

    #[must_use]
    pub fn describe(&self, status: reqwest::StatusCode) -> String {
        format!(
            "{} (HTTP {}): {}",
            self.code(),
            status.as_u16(),
            self.message.as_deref().unwrap_or("no message")
        )
    }
}

// ── SigV4 ────────────────────────────────────────────────────────────────────

/// Signature Version 4 signer for one service in one region.
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    credentials: Credentials,
    region: String,
    service: String,
}

impl SigV4Signer {
    #[must_use]
    pub fn new(credentials: Credentials, region: &str, service: &str) -> Self {
        Self {
            credentials,
            region: region.to_string(),
            service: service.to_string(),
        }
    }

    /// Headers to add to a request so it carries a valid signature.
    ///
    /// `headers` are extra headers to sign; keys must be lowercase. The
    /// result includes them plus `host`, `x-amz-date`, the optional
    /// `x-amz-security-token`, and `authorization`.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` has no host.
    pub fn sign(
        &self,
        method: &str,
        url: &Url,
        headers: &BTreeMap<String, String>,
        body: &[u8],
        timestamp: DateTime<Utc>,
    ) -> Result<BTreeMap<String, String>> {
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => anyhow::bail!("URL has no host: {url}"),
        };
        let amz_date = timestamp.format("%Y%m%dT%H%M%SZ").to_string();
        let date_stamp = timestamp.format("%Y%m%d").to_string();

        let mut signed = headers.clone();
        signed.insert("host".to_string(), host);
        signed.insert("x-amz-date".to_string(), amz_date.clone());
        if let Some(token) = &self.credentials.session_token {
            signed.insert("x-amz-security-token".to_string(), token.clone());
        }

        let canonical_headers: String = signed
            .iter()
            .map(|(k, v)| format!("{k}:{}\n", v.trim()))
            .collect();
        let signed_headers = signed.keys().cloned().collect::<Vec<_>>().join(";");
        let payload_hash = hex::encode(Sha256::digest(body));

        let canonical_request = format!(
            "{}\n{}\n{}\n{canonical_headers}\n{signed_headers}\n{payload_hash}",
            method.to_uppercase(),
            canonical_uri(url),
            canonical_query(url),
        );

        let scope = format!(
            "{date_stamp}/{}/{}/aws4_request",
            self.region, self.service
        );
        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );
        let signature = hex::encode(self.signing_mac(&date_stamp, string_to_sign.as_bytes()));

        signed.insert(
            "authorization".to_string(),
            format!(
                "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
                self.credentials.access_key_id
            ),
        );
        Ok(signed)
    }

    fn signing_mac(&self, date_stamp: &str, data: &[u8]) -> Vec<u8> {
        let k_date = hmac_sha256(
            format!("AWS4{}", self.credentials.secret_access_key).as_bytes(),
            date_stamp.as_bytes(),
        );
        let k_region = hmac_sha256(&k_date, self.region.as_bytes());
        let k_service = hmac_sha256(&k_region, self.service.as_bytes());
        let k_signing = hmac_sha256(&k_service, b"aws4_request");
        hmac_sha256(&k_signing, data)
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length.
    #[allow(clippy::expect_used)]
    let mut mac = HmacSha256::new_from_slice(key).expect("any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Each segment of the (already encoded) path is encoded again.
fn canonical_uri(url: &Url) -> String {
    let path = url.path();
    if path.is_empty() {
        return "/".to_string();
    }
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, UNRESERVED).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            (
                utf8_percent_encode(&k, UNRESERVED).to_string(),
                utf8_percent_encode(&v, UNRESERVED).to_string(),
            )
        })
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Sign and send a JSON request, returning status and body text.
///
/// # Errors
///
/// Returns an error on signing or transport failure. HTTP error statuses are
/// returned to the caller, not turned into errors.
pub async fn send_signed(
    client: &Client,
    signer: &SigV4Signer,
    method: reqwest::Method,
    url: &str,
    extra_headers: &[(&str, &str)],
    body: Option<&serde_json::Value>,
) -> Result<(reqwest::StatusCode, String)> {
    let url = Url::parse(url).with_context(|| format!("invalid URL: {url}"))?;
    let body_bytes = match body {
        Some(v) => serde_json::to_vec(v).context("cannot serialize request body")?,
        None => Vec::new(),
    };
    let mut headers: BTreeMap<String, String> = extra_headers
        .iter()
        .map(|(k, v)| (k.to_lowercase(), (*v).to_string()))
        .collect();
    if body.is_some() && !headers.contains_key("content-type") {
        headers.insert("content-type".to_string(), "application/json".to_string());
    }
    let signed = signer.sign(method.as_str(), &url, &headers, &body_bytes, Utc::now())?;

    tracing::debug!(%method, %url, "AWS request");
    let mut request = client.request(method.clone(), url.clone());
    for (k, v) in &signed {
        if k != "host" {
            request = request.header(k.as_str(), v.as_str());
        }
    }
    let response = request
        .body(body_bytes)
        .send()
        .await
        .with_context(|| format!("{method} {url} failed"))?;
    let status = response.status();
    let text = response
        .text()
        .await
        .with_context(|| format!("reading response from {url}"))?;
    tracing::debug!(%method, %url, status = status.as_u16(), "AWS response");
    Ok((status, text))
}
