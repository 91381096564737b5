//! HTTP implementation of the `EndpointProbe` port.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;

use crate::application::ports::EndpointProbe;
use crate::domain::Protocol;
use crate::domain::connectivity::ProbeOutcome;

/// Per-request timeout for probes. Agents may take a while to answer a prompt.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(120);

pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }
}

fn accept_header(protocol: Protocol) -> &'static str {
    match protocol {
        Protocol::Http => "application/json",
        Protocol::Mcp => "application/json, text/event-stream",
    }
}

impl EndpointProbe for HttpProbe {
    async fn probe(
        &self,
        url: &str,
        bearer: Option<&str>,
        protocol: Protocol,
        payload: &Value,
    ) -> ProbeOutcome {
        let mut request = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("Accept", accept_header(protocol))
            .json(payload);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(url, error = %e, "probe transport failure");
                let kind = if e.is_timeout() {
                    "timed out"
                } else if e.is_connect() {
                    "connection failed"
                } else {
                    "request failed"
                };
                return ProbeOutcome::TransportFailed {
                    reason: format!("{kind}: {e}"),
                };
            }
        };
        let status = response.status().as_u16();
        // The status alone decides reachability; a truncated body only loses detail.
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(url, status, error = %e, "probe response body unreadable");
                String::new()
            }
        };
        ProbeOutcome::Responded { status, body }
    }
}
