//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags, TargetFlags};
use crate::commands;

/// Deploy, verify and smoke-test JWT-protected agent runtimes
#[derive(Parser)]
#[command(
    name = "agentcore",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip interactive prompts
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Identity-provider test configuration file
    #[arg(long, global = true, env = "AGENTCORE_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Region override (defaults to the config file's region)
    #[arg(long, global = true, env = "AWS_REGION")]
    pub region: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate and record an agent deployment
    Configure(commands::configure::ConfigureArgs),

    /// Build (if needed) and create or update the runtime
    Launch(commands::launch::LaunchArgs),

    /// Show runtime and endpoint status
    Status(commands::status::StatusArgs),

    /// Send one authenticated probe to the endpoint
    Verify(commands::verify::VerifyArgs),

    /// Configure, launch, wait and verify in one go
    Deploy(commands::deploy::DeployArgs),

    /// Run prompt suites against the endpoint
    Smoke(commands::smoke::SmokeArgs),

    /// Authenticate the test user
    #[command(subcommand)]
    Auth(commands::auth::AuthCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            verbose: _,
            yes,
            config,
            region,
            command,
        } = self;
        let app = AppContext::new(AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            behaviour: BehaviourFlags { yes },
            target: TargetFlags { config, region },
        });

        match command {
            Command::Configure(args) => commands::configure::run(&app, args).await,
            Command::Launch(args) => commands::launch::run(&app, args).await,
            Command::Status(args) => commands::status::run(&app, args).await,
            Command::Verify(args) => commands::verify::run(&app, args).await,
            Command::Deploy(args) => commands::deploy::run(&app, args).await,
            Command::Smoke(args) => commands::smoke::run(&app, args).await,
            Command::Auth(cmd) => commands::auth::run(&app, cmd).await,
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Version => commands::version::run(&app),
        }
    }
}
