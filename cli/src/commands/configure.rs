//! `agentcore configure`: validate a deployment and record it in the descriptor.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::config_service;
use crate::application::services::configure::{
    ConfigureRequest, build_deployment_config, configure,
};
use crate::domain::{
    AuthorizerConfig, CognitoTestConfig, ConfigurationHandle, ContainerSource, Protocol,
};
use crate::infra::config::OsFs;

/// Default Lambda authorizer cache TTL.
const DEFAULT_AUTHORIZER_TTL: u32 = 300;

#[derive(Args, Clone)]
pub struct ConfigureArgs {
    /// Agent (runtime) name
    #[arg(short, long)]
    pub name: String,

    /// Agent entrypoint file
    #[arg(short, long)]
    pub entrypoint: PathBuf,

    /// Dependency file installed by the generated Dockerfile (must sit in
    /// the entrypoint's directory)
    #[arg(short, long)]
    pub requirements: Option<PathBuf>,

    /// Server protocol exposed by the agent
    #[arg(long, value_enum, default_value_t = Protocol::Http)]
    pub protocol: Protocol,

    /// IAM role the runtime assumes
    #[arg(long, value_name = "ARN")]
    pub execution_role: String,

    /// Use a pre-built image instead of building one
    #[arg(long, value_name = "URI", conflicts_with = "ecr")]
    pub image: Option<String>,

    /// Registry repository to build into (default: bedrock-agentcore-<name>)
    #[arg(long, value_name = "REPOSITORY")]
    pub ecr: Option<String>,

    /// Fail instead of creating the repository when it does not exist
    #[arg(long, conflicts_with = "image")]
    pub no_create_ecr: bool,

    /// Gate the endpoint with a Lambda authorizer instead of the JWT authorizer
    #[arg(long, value_name = "ARN")]
    pub lambda_authorizer: Option<String>,

    /// Lambda authorizer cache TTL in seconds
    #[arg(long, default_value_t = DEFAULT_AUTHORIZER_TTL, requires = "lambda_authorizer")]
    pub authorizer_ttl: u32,

    /// Runtime environment variable (repeatable)
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,
}

impl ConfigureArgs {
    #[must_use]
    pub fn into_request(self, region: Option<String>) -> ConfigureRequest {
        let container = match self.image {
            Some(uri) => ContainerSource::Image { uri },
            None => ContainerSource::Build {
                repository: self
                    .ecr
                    .unwrap_or_else(|| default_repository(&self.name)),
                auto_create: !self.no_create_ecr,
                repository_uri: None,
            },
        };
        let authorizer = self.lambda_authorizer.map(|lambda_arn| AuthorizerConfig::Lambda {
            lambda_arn,
            ttl_seconds: self.authorizer_ttl,
        });
        ConfigureRequest {
            agent_name: self.name,
            entrypoint: self.entrypoint,
            requirements: self.requirements,
            region,
            protocol: self.protocol,
            execution_role_arn: self.execution_role,
            container,
            authorizer,
            environment: self.env.into_iter().collect::<BTreeMap<_, _>>(),
        }
    }
}

/// Registry repository names are lowercase and may not contain `_`.
#[must_use]
pub fn default_repository(agent_name: &str) -> String {
    format!(
        "bedrock-agentcore-{}",
        agent_name.to_lowercase().replace('_', "-")
    )
}

fn parse_env_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

/// Run the configure command.
pub async fn run(app: &AppContext, args: ConfigureArgs) -> Result<ExitCode> {
    let config = config_service::load_config(&app.config_store)?;
    if let Some(warning) = config_service::discovery_mismatch(&config) {
        app.output.warn(&warning);
    }
    let handle = configure_agent(app, &config, args).await?;
    app.renderer().render_configured(&handle)?;
    Ok(ExitCode::SUCCESS)
}

/// Shared with `deploy`.
pub(crate) async fn configure_agent(
    app: &AppContext,
    config: &CognitoTestConfig,
    args: ConfigureArgs,
) -> Result<ConfigurationHandle> {
    let deployment = build_deployment_config(config, args.into_request(app.region.clone()));
    // Reject bad input before credentials are looked up.
    deployment.validate()?;

    let registry = match deployment.container {
        ContainerSource::Build { .. } => {
            let credentials = app.aws_credentials(&deployment.region).await?;
            Some(app.registry(credentials, &deployment.region)?)
        }
        ContainerSource::Image { .. } => None,
    };
    configure(
        deployment,
        &app.descriptors,
        registry.as_ref(),
        &OsFs,
        &app.reporter(),
    )
    .await
}
