//! JSON output helpers.
//!
//! `format_error` is the error object printed by every `--json` code path
//! when a command fails; `JsonRenderer` prints successful results.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;

use crate::application::services::smoke::SmokeSummary;
use crate::domain::auth::TokenSet;
use crate::domain::smoke::SmokeSuite;
use crate::domain::{
    CognitoTestConfig, ConfigurationHandle, ConnectivityReport, DeploymentStatus, LaunchResult,
};

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

fn print<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    println!("{out}");
    Ok(())
}

/// Machine-readable renderer for `--json`.
pub struct JsonRenderer;

impl JsonRenderer {
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_config(&self, config: &CognitoTestConfig, path: &Path) -> Result<()> {
        print(&json!({
            "path": path.display().to_string(),
            "config": config,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_config_set(&self, key: &str, value: &str) -> Result<()> {
        print(&json!({ "key": key, "value": value }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_configured(&self, handle: &ConfigurationHandle) -> Result<()> {
        print(&json!({
            "agent_name": handle.agent_name,
            "descriptor": handle.descriptor_path.display().to_string(),
        }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_launch(&self, result: &LaunchResult) -> Result<()> {
        print(result)
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_status(
        &self,
        agent: &str,
        status: &DeploymentStatus,
        timed_out: bool,
    ) -> Result<()> {
        print(&json!({
            "agent_name": agent,
            "status": status,
            "terminal": status.is_terminal(),
            "timed_out": timed_out,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_connectivity(&self, report: &ConnectivityReport) -> Result<()> {
        print(report)
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_deploy(
        &self,
        launch: &LaunchResult,
        status: &DeploymentStatus,
        connectivity: Option<&ConnectivityReport>,
    ) -> Result<()> {
        print(&json!({
            "launch": launch,
            "status": status,
            "connectivity": connectivity,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_smoke(&self, summary: &SmokeSummary) -> Result<()> {
        print(&json!({
            "total": summary.results.len(),
            "functional": summary.functional_count(),
            "all_functional": summary.all_functional(),
            "results": summary.results,
            "skipped": summary.skipped,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_suites(&self, suites: &[SmokeSuite]) -> Result<()> {
        print(suites)
    }

    /// Token values are included only when `show_token` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_tokens(&self, username: &str, tokens: &TokenSet, show_token: bool) -> Result<()> {
        let mut obj = json!({
            "username": username,
            "token_type": tokens.token_type,
            "expires_in": tokens.expires_in,
        });
        if show_token {
            obj["access_token"] = json!(tokens.access_token);
            obj["id_token"] = json!(tokens.id_token);
        }
        print(&obj)
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        print(&json!({ "version": version }))
    }
}
