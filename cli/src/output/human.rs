//! Human-readable terminal renderer.

use std::path::Path;
use std::time::Duration;

use owo_colors::OwoColorize as _;

use crate::application::services::smoke::SmokeSummary;
use crate::domain::auth::TokenSet;
use crate::domain::smoke::SmokeSuite;
use crate::domain::{
    CognitoTestConfig, ConfigurationHandle, ConnectivityReport, DeploymentStatus, LaunchResult,
    RuntimeStatus,
};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        println!("agentcore {version}");
    }

    /// Render the identity-provider test configuration. The client secret is masked.
    pub fn render_config(&self, config: &CognitoTestConfig, path: &Path) {
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        println!("  {:<26} {}", "region:", config.region);
        println!(
            "  {:<26} {}",
            "user_pool.user_pool_id:", config.user_pool.user_pool_id
        );
        println!(
            "  {:<26} {}",
            "app_client.client_id:", config.app_client.client_id
        );
        if config.app_client.client_secret.is_some() {
            println!("  {:<26} {}", "app_client.client_secret:", "********");
        }
        println!(
            "  {:<26} {}",
            "test_user.username:",
            config.test_username().unwrap_or("(not set)")
        );
        println!("  {:<26} {}", "discovery_url:", config.discovery_url);
        if let Some(domain) = config
            .custom_domain
            .as_ref()
            .and_then(|d| d.domain.as_deref())
        {
            println!("  {:<26} {domain}", "custom_domain.domain:");
        }
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        for var in ["AGENTCORE_CONFIG", "AWS_REGION", "AWS_PROFILE", "NO_COLOR"] {
            println!(
                "    {:<18} {}",
                format!("{var}:"),
                std::env::var(var).unwrap_or_else(|_| "(not set)".to_string())
            );
        }
        println!();
    }

    pub fn render_config_set(&self, key: &str, value: &str) {
        self.ctx.success(&format!("Set {key} = {value}"));
    }

    pub fn render_configured(&self, handle: &ConfigurationHandle) {
        self.ctx.kv("Agent:", &handle.agent_name);
        self.ctx
            .kv("Descriptor:", &handle.descriptor_path.display().to_string());
        self.ctx.info("Next: agentcore launch");
    }

    pub fn render_launch(&self, result: &LaunchResult) {
        let verb = if result.updated_existing {
            "Updated"
        } else {
            "Created"
        };
        self.ctx
            .success(&format!("{verb} runtime for '{}'", result.agent_name));
        self.ctx.kv("Runtime ID:", &result.runtime_id);
        self.ctx.kv("Runtime ARN:", &result.runtime_arn);
        if let Some(version) = &result.version {
            self.ctx.kv("Version:", version);
        }
    }

    /// Render one deployment snapshot. `timed_out` carries the elapsed time
    /// when polling gave up before both halves became terminal.
    pub fn render_status(&self, agent: &str, status: &DeploymentStatus, timed_out: Option<Duration>) {
        self.ctx.header(&format!("Deployment: {agent}"));
        println!(
            "  {:<12} {}",
            "Agent:",
            status
                .agent
                .status
                .as_str()
                .style(status_style(self.ctx, status.agent.status))
        );
        println!(
            "  {:<12} {}",
            "Endpoint:",
            status
                .endpoint
                .status
                .as_str()
                .style(status_style(self.ctx, status.endpoint.status))
        );
        if let Some(url) = &status.endpoint.url {
            self.ctx.kv("URL:", url);
        }
        if let Some(elapsed) = timed_out {
            self.ctx.warn(&format!(
                "Timed out after {} waiting for a terminal state",
                format_elapsed(elapsed)
            ));
        } else if status.is_failed() {
            self.ctx.error("Deployment failed");
        }
    }

    pub fn render_connectivity(&self, report: &ConnectivityReport) {
        self.ctx.kv("Endpoint:", &report.endpoint_url);
        if report.functional {
            self.ctx.success(&report.detail);
        } else if report.reachable {
            self.ctx.warn(&report.detail);
        } else {
            self.ctx.error(&report.detail);
        }
    }

    pub fn render_deploy(
        &self,
        launch: &LaunchResult,
        status: &DeploymentStatus,
        connectivity: Option<&ConnectivityReport>,
    ) {
        self.render_launch(launch);
        println!();
        self.render_status(&launch.agent_name, status, None);
        if let Some(report) = connectivity {
            println!();
            self.render_connectivity(report);
        }
    }

    pub fn render_smoke(&self, summary: &SmokeSummary) {
        println!();
        for result in &summary.results {
            let mark = if result.report.functional {
                "✓".style(self.ctx.styles.success).to_string()
            } else {
                "✗".style(self.ctx.styles.error).to_string()
            };
            println!("  {mark} [{}] {}", result.suite, result.prompt);
            if !result.report.functional {
                println!("      {}", result.report.detail.style(self.ctx.styles.dim));
            }
        }
        println!();
        println!(
            "  {}",
            format_smoke_summary(summary.functional_count(), summary.results.len())
                .style(self.ctx.styles.bold)
        );
    }

    pub fn render_suites(&self, suites: &[SmokeSuite]) {
        println!("Available test types:\n");
        for suite in suites {
            println!(
                "  {:<16} {:<5} {}",
                suite.name,
                suite.protocol.as_str(),
                suite.description
            );
        }
    }

    pub fn render_tokens(&self, username: &str, tokens: &TokenSet, show_token: bool) {
        self.ctx.success(&format!(
            "Authenticated as {username} (expires in {})",
            format_elapsed(Duration::from_secs(tokens.expires_in))
        ));
        if show_token {
            println!("{}", tokens.access_token);
        }
    }
}

// ── Display helpers ──────────────────────────────────────────────────────────

fn status_style(ctx: &OutputContext, status: RuntimeStatus) -> owo_colors::Style {
    match status {
        RuntimeStatus::Ready => ctx.styles.success,
        RuntimeStatus::CreateFailed | RuntimeStatus::UpdateFailed => ctx.styles.error,
        RuntimeStatus::Creating | RuntimeStatus::Updating => ctx.styles.warning,
        RuntimeStatus::Unknown => ctx.styles.dim,
    }
}

#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let minutes = secs / 60;
    let seconds = secs % 60;
    if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// One-line progress text for a polling snapshot.
#[must_use]
pub fn format_snapshot(status: &DeploymentStatus, elapsed: Duration) -> String {
    format!(
        "agent {} · endpoint {} ({})",
        status.agent.status,
        status.endpoint.status,
        format_elapsed(elapsed)
    )
}

#[must_use]
pub fn format_smoke_summary(functional: usize, total: usize) -> String {
    format!("{functional}/{total} prompts functional")
}
