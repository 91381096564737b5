//! Output formatting module

pub mod human;
pub mod json;
pub mod progress;
pub mod reporter;
pub mod styles;

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use console::Term;
use owo_colors::OwoColorize as _;
pub use styles::Styles;

use crate::application::services::smoke::SmokeSummary;
use crate::domain::auth::TokenSet;
use crate::domain::smoke::SmokeSuite;
use crate::domain::{
    CognitoTestConfig, ConfigurationHandle, ConnectivityReport, DeploymentStatus, LaunchResult,
};
pub use human::HumanRenderer;
pub use json::JsonRenderer;
pub use reporter::TerminalReporter;

/// Output context carrying styling and terminal state.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let use_colors = !no_color && is_tty && std::env::var("NO_COLOR").is_err();

        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }

        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Check if progress indicators should be shown.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    /// Print a success message prefixed with `✓`. Suppressed when `quiet`.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "✓".style(self.styles.success));
        }
    }

    /// Print a warning message prefixed with `⚠`. Suppressed when `quiet`.
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "⚠".style(self.styles.warning));
        }
    }

    /// Print an error message prefixed with `✗` to stderr. Never suppressed.
    pub fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", "✗".style(self.styles.error));
    }

    /// Print an info message prefixed with `ℹ`. Suppressed when `quiet`.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "ℹ".style(self.styles.info));
        }
    }

    /// Print a section header. Suppressed when `quiet`.
    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("  {}", msg.style(self.styles.header));
        }
    }

    /// Print a key-value pair with the key dimmed. Suppressed when `quiet`.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {}  {value}", key.style(self.styles.dim));
        }
    }
}

/// Result renderer selected by `--json`.
///
/// Commands build their result and hand it to the renderer; neither variant
/// performs any I/O besides writing to stdout.
pub enum Renderer<'a> {
    Human(HumanRenderer<'a>),
    Json(JsonRenderer),
}

impl Renderer<'_> {
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_version(version);
                Ok(())
            }
            Self::Json(r) => r.render_version(version),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_config(&self, config: &CognitoTestConfig, path: &Path) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_config(config, path);
                Ok(())
            }
            Self::Json(r) => r.render_config(&redact_config(config), path),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_config_set(&self, key: &str, value: &str) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_config_set(key, value);
                Ok(())
            }
            Self::Json(r) => r.render_config_set(key, value),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_configured(&self, handle: &ConfigurationHandle) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_configured(handle);
                Ok(())
            }
            Self::Json(r) => r.render_configured(handle),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_launch(&self, result: &LaunchResult) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_launch(result);
                Ok(())
            }
            Self::Json(r) => r.render_launch(result),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_status(
        &self,
        agent: &str,
        status: &DeploymentStatus,
        timed_out: Option<Duration>,
    ) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_status(agent, status, timed_out);
                Ok(())
            }
            Self::Json(r) => r.render_status(agent, status, timed_out.is_some()),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_connectivity(&self, report: &ConnectivityReport) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_connectivity(report);
                Ok(())
            }
            Self::Json(r) => r.render_connectivity(report),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_deploy(
        &self,
        launch: &LaunchResult,
        status: &DeploymentStatus,
        connectivity: Option<&ConnectivityReport>,
    ) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_deploy(launch, status, connectivity);
                Ok(())
            }
            Self::Json(r) => r.render_deploy(launch, status, connectivity),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_smoke(&self, summary: &SmokeSummary) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_smoke(summary);
                Ok(())
            }
            Self::Json(r) => r.render_smoke(summary),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_suites(&self, suites: &[SmokeSuite]) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_suites(suites);
                Ok(())
            }
            Self::Json(r) => r.render_suites(suites),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_tokens(&self, username: &str, tokens: &TokenSet, show_token: bool) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_tokens(username, tokens, show_token);
                Ok(())
            }
            Self::Json(r) => r.render_tokens(username, tokens, show_token),
        }
    }
}

/// Copy of `config` with the app-client secret masked.
#[must_use]
pub fn redact_config(config: &CognitoTestConfig) -> CognitoTestConfig {
    let mut out = config.clone();
    if out.app_client.client_secret.is_some() {
        out.app_client.client_secret = Some("********".to_string());
    }
    out
}
