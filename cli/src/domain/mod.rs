//! Deployment domain: configuration schema, runtime descriptors, authorizer
//! rules, connectivity assessment and smoke suites.
//!
//! Nothing here touches the network or the filesystem. Callers in
//! `crate::application` feed data in and get data or typed errors back.

pub mod auth;
pub mod authorizer;
pub mod config;
pub mod connectivity;
pub mod deployment;
pub mod error;
pub mod smoke;

pub use agentcore_common::{
    AgentStatus, ConnectivityReport, DeploymentStatus, EndpointStatus, Protocol, RuntimeStatus,
};
pub use authorizer::AuthorizerConfig;
pub use config::{CognitoTestConfig, validate_config_key, validate_config_value};
pub use deployment::{
    ConfigurationHandle, ContainerSource, DeploymentConfig, LaunchResult, RuntimeDescriptor,
    RuntimeRecord,
};
pub use error::{AuthError, ConfigError, ConnectivityError, DeploymentError, TimeoutError};
