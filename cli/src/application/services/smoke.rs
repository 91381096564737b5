//! Application service: smoke runner.
//!
//! Prompts are sent one at a time, suite by suite, in declaration order.

use serde::Serialize;

use crate::application::ports::{EndpointProbe, ProgressReporter};
use crate::application::services::verify::verify;
use crate::domain::smoke::SmokeSuite;
use crate::domain::{ConnectivityReport, Protocol};

#[derive(Debug, Clone, Serialize)]
pub struct PromptResult {
    pub suite: &'static str,
    pub prompt: &'static str,
    #[serde(flatten)]
    pub report: ConnectivityReport,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SmokeSummary {
    pub results: Vec<PromptResult>,
    /// Suites not run because they target a different protocol.
    pub skipped: Vec<&'static str>,
}

impl SmokeSummary {
    #[must_use]
    pub fn functional_count(&self) -> usize {
        self.results.iter().filter(|r| r.report.functional).count()
    }

    /// At least one prompt ran and every prompt was functional.
    #[must_use]
    pub fn all_functional(&self) -> bool {
        !self.results.is_empty() && self.results.iter().all(|r| r.report.functional)
    }
}

/// Run the given suites against one endpoint.
pub async fn run_suites(
    probe: &impl EndpointProbe,
    endpoint_url: &str,
    bearer: Option<&str>,
    protocol: Protocol,
    suites: &[&'static SmokeSuite],
    reporter: &impl ProgressReporter,
) -> SmokeSummary {
    let mut summary = SmokeSummary::default();
    for suite in suites {
        if suite.protocol != protocol {
            reporter.warn(&format!(
                "skipping suite '{}': written for {} but the runtime speaks {protocol}",
                suite.name, suite.protocol
            ));
            summary.skipped.push(suite.name);
            continue;
        }
        for &prompt in suite.prompts {
            reporter.step(&format!("[{}] {prompt}", suite.name));
            let report = verify(probe, endpoint_url, bearer, protocol, prompt).await;
            if report.functional {
                reporter.success(&format!("[{}] {prompt}", suite.name));
            } else {
                reporter.warn(&format!("[{}] {prompt}: {}", suite.name, report.detail));
            }
            summary.results.push(PromptResult {
                suite: suite.name,
                prompt,
                report,
            });
        }
    }
    summary
}
