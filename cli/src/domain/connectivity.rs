//! Probe payloads and the reachable-vs-functional assessment.
//!
//! Pure functions only. The probe itself lives behind the `EndpointProbe` port.

use agentcore_common::{ConnectivityReport, Protocol};
use serde_json::{Value, json};

/// Longest response excerpt kept in a report.
const PREVIEW_CHARS: usize = 200;

/// What came back from a single probe request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The endpoint answered with an HTTP status.
    Responded { status: u16, body: String },
    /// Connection refused, DNS failure, TLS failure, or timeout.
    TransportFailed { reason: String },
}

/// Default probe message when the caller supplies none.
#[must_use]
pub fn default_prompt(protocol: Protocol) -> &'static str {
    match protocol {
        Protocol::Http => "Hello",
        Protocol::Mcp => "tools/list",
    }
}

/// Request body for a probe.
///
/// HTTP runtimes take `{"prompt": ...}`; MCP runtimes take a JSON-RPC call
/// whose method is `prompt`.
#[must_use]
pub fn probe_payload(protocol: Protocol, prompt: &str) -> Value {
    match protocol {
        Protocol::Http => json!({ "prompt": prompt }),
        Protocol::Mcp => json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": prompt,
            "params": {},
        }),
    }
}

/// Classify a probe outcome.
///
/// Any HTTP answer proves reachability; only 2xx is functional. A transport
/// failure is neither.
#[must_use]
pub fn assess(endpoint_url: &str, outcome: &ProbeOutcome) -> ConnectivityReport {
    match outcome {
        ProbeOutcome::Responded { status, body } => {
            let functional = (200..300).contains(status);
            let detail = if functional {
                preview(body)
            } else {
                format!("endpoint rejected the request (HTTP {status}): {}", preview(body))
            };
            ConnectivityReport {
                endpoint_url: endpoint_url.to_string(),
                reachable: true,
                functional,
                http_status: Some(*status),
                detail,
            }
        }
        ProbeOutcome::TransportFailed { reason } => ConnectivityReport {
            endpoint_url: endpoint_url.to_string(),
            reachable: false,
            functional: false,
            http_status: None,
            detail: reason.clone(),
        },
    }
}

fn preview(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= PREVIEW_CHARS {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(PREVIEW_CHARS).collect();
    out.push('…');
    out
}
