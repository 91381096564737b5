//! agentcore CLI - deploy and smoke-test JWT-protected agent runtimes

#![cfg_attr(test, allow(clippy::expect_used))]

use std::process::ExitCode;

use agentcore_cli::cli::Cli;
use agentcore_cli::domain::error::error_code;
use agentcore_cli::output::json::format_error;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json = cli.json;
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            report_error(&e, json);
            ExitCode::FAILURE
        }
    }
}

/// Diagnostics go to stderr so stdout stays clean for `--json`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn report_error(e: &anyhow::Error, json: bool) {
    if json {
        match format_error(&format!("{e:#}"), error_code(e)) {
            Ok(out) => println!("{out}"),
            Err(_) => eprintln!("Error: {e}"),
        }
    } else {
        eprintln!("Error: {e:#}");
    }
}
