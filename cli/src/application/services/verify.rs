//! Application service: connectivity verifier.

use crate::application::ports::EndpointProbe;
use crate::domain::connectivity::{assess, probe_payload};
use crate::domain::error::ConnectivityError;
use crate::domain::{ConnectivityReport, Protocol};

/// Send one authenticated probe and classify the answer.
///
/// An HTTP answer of any status is reachable; only 2xx is functional.
pub async fn verify(
    probe: &impl EndpointProbe,
    endpoint_url: &str,
    bearer: Option<&str>,
    protocol: Protocol,
    prompt: &str,
) -> ConnectivityReport {
    let payload = probe_payload(protocol, prompt);
    let outcome = probe.probe(endpoint_url, bearer, protocol, &payload).await;
    let report = assess(endpoint_url, &outcome);
    tracing::debug!(
        url = endpoint_url,
        reachable = report.reachable,
        functional = report.functional,
        status = ?report.http_status,
        "probe complete"
    );
    report
}

/// Turn an unreachable report into a hard failure.
///
/// # Errors
///
/// Returns [`ConnectivityError`] when the endpoint was not reachable.
pub fn require_reachable(report: &ConnectivityReport) -> Result<(), ConnectivityError> {
    if report.reachable {
        Ok(())
    } else {
        Err(ConnectivityError {
            url: report.endpoint_url.clone(),
            reason: report.detail.clone(),
        })
    }
}
