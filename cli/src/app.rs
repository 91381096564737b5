//! Application context: unified state passed to every command handler.
//!
//! Remote clients are built on demand because most commands need the
//! configuration file loaded first, and some (`config`, `smoke --list-types`)
//! never touch the network.

use std::path::PathBuf;

use anyhow::Result;

use crate::domain::error::AuthError;
use crate::infra::aws::{self, Credentials, DEFAULT_HTTP_TIMEOUT, Endpoints, SigV4Signer};
use crate::infra::cognito::CognitoTokenProvider;
use crate::infra::config::{JsonConfigStore, YamlDescriptorStore, resolve_config_path};
use crate::infra::control_plane::{self, HttpControlPlane};
use crate::infra::probe::{DEFAULT_PROBE_TIMEOUT, HttpProbe};
use crate::infra::registry::{self, EcrRegistry};
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer, TerminalReporter};

/// Environment variable holding the test user's password.
pub const TEST_PASSWORD_ENV: &str = "AGENTCORE_TEST_PASSWORD";

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Behaviour flags.
pub struct BehaviourFlags {
    /// Skip interactive prompts (also set by `CI` / `AGENTCORE_YES` env vars).
    pub yes: bool,
}

/// Where configuration lives and which region to talk to.
pub struct TargetFlags {
    /// `--config` / `AGENTCORE_CONFIG`.
    pub config: Option<PathBuf>,
    /// `--region` / `AWS_REGION`; overrides the config file's region.
    pub region: Option<String>,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    pub output: OutputFlags,
    pub behaviour: BehaviourFlags,
    pub target: TargetFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Identity-provider test configuration file.
    pub config_store: JsonConfigStore,
    /// Runtime descriptor in the current directory.
    pub descriptors: YamlDescriptorStore,
    /// Region override from the command line.
    pub region: Option<String>,
    /// When `true`, skip interactive prompts and use defaults.
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: AppFlags) -> Self {
        let ci_env = std::env::var("CI").is_ok() || std::env::var("AGENTCORE_YES").is_ok();
        let non_interactive = flags.behaviour.yes || ci_env;

        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        // Progress lines would corrupt the JSON document on stdout.
        let quiet = flags.output.quiet || flags.output.json;

        Self {
            output: OutputContext::new(flags.output.no_color, quiet),
            mode,
            config_store: JsonConfigStore::new(resolve_config_path(flags.target.config)),
            descriptors: YamlDescriptorStore::in_current_dir(),
            region: flags.target.region.filter(|r| !r.trim().is_empty()),
            non_interactive,
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }

    /// Region override, else `fallback`.
    #[must_use]
    pub fn region_or(&self, fallback: &str) -> String {
        self.region.clone().unwrap_or_else(|| fallback.to_string())
    }

    /// Ask the user for confirmation.
    ///
    /// When `non_interactive` is `true` (CI, `--yes` flag, or `AGENTCORE_YES` env),
    /// returns `default` immediately without prompting.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails (e.g. no TTY available).
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.non_interactive {
            return Ok(default);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }

    /// Test-user password from `AGENTCORE_TEST_PASSWORD`, else an interactive prompt.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingPassword`] when the variable is unset and
    /// prompting is disabled, or the prompt error.
    pub fn test_password(&self, username: &str) -> Result<String> {
        if let Ok(password) = std::env::var(TEST_PASSWORD_ENV)
            && !password.is_empty()
        {
            return Ok(password);
        }
        if self.non_interactive {
            return Err(AuthError::MissingPassword.into());
        }
        let password = dialoguer::Password::new()
            .with_prompt(format!("Password for {username}"))
            .interact()?;
        Ok(password)
    }

    /// AWS credentials from the standard provider chain.
    ///
    /// # Errors
    ///
    /// Returns an error if no AWS credentials are available.
    pub async fn aws_credentials(&self, region: &str) -> Result<Credentials> {
        Credentials::load(region).await
    }

    /// Signed control-plane client for `region`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn control_plane(&self, credentials: Credentials, region: &str) -> Result<HttpControlPlane> {
        let signer = SigV4Signer::new(credentials, region, control_plane::SIGNING_SERVICE);
        Ok(HttpControlPlane::new(
            aws::http_client(DEFAULT_HTTP_TIMEOUT)?,
            signer,
            &Endpoints::resolve(region),
        ))
    }

    /// Signed container-registry client for `region`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn registry(&self, credentials: Credentials, region: &str) -> Result<EcrRegistry> {
        let signer = SigV4Signer::new(credentials, region, registry::SIGNING_SERVICE);
        Ok(EcrRegistry::new(
            aws::http_client(DEFAULT_HTTP_TIMEOUT)?,
            signer,
            &Endpoints::resolve(region),
        ))
    }

    /// Identity-provider client for `region`. Needs no AWS credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn token_provider(&self, region: &str) -> Result<CognitoTokenProvider> {
        Ok(CognitoTokenProvider::new(
            aws::http_client(DEFAULT_HTTP_TIMEOUT)?,
            &Endpoints::resolve(region).cognito,
        ))
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn probe(&self) -> Result<HttpProbe> {
        HttpProbe::new(DEFAULT_PROBE_TIMEOUT)
    }
}
