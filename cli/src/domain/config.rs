//! Domain types and validators for the identity-provider test configuration.
//!
//! Parsing works on file contents; reading and writing the file is `infra::config`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

/// Keys that must be present (as non-empty strings) for the file to load.
pub const REQUIRED_KEYS: &[&str] = &[
    "user_pool.user_pool_id",
    "app_client.client_id",
    "region",
    "discovery_url",
];

/// Keys that `agentcore config set` may rewrite.
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "discovery_url",
    "region",
    "app_client.client_id",
    "user_pool.user_pool_id",
    "test_user.username",
];

// ── Config schema ────────────────────────────────────────────────────────────

/// Contents of `cognito_config.json`.
///
/// Every struct carries a flattened `extra` map so keys this tool does not
/// know about survive a load/save cycle untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CognitoTestConfig {
    pub user_pool: UserPool,
    pub app_client: AppClient,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_user: Option<TestUser>,
    pub discovery_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_domain: Option<CustomDomain>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserPool {
    pub user_pool_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppClient {
    pub client_id: String,
    /// Present only for confidential app clients; enables `SECRET_HASH`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TestUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TestUser {
    /// Login name: explicit username, falling back to the email address.
    #[must_use]
    pub fn login_name(&self) -> Option<&str> {
        self.username.as_deref().or(self.email.as_deref())
    }
}

/// Optional hosted-UI custom domain block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomDomain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CognitoTestConfig {
    /// Discovery URL the identity provider publishes for this user pool.
    #[must_use]
    pub fn expected_discovery_url(&self) -> String {
        format!(
            "https://cognito-idp.{}.amazonaws.com/{}/.well-known/openid-configuration",
            self.region, self.user_pool.user_pool_id
        )
    }

    /// Whether `discovery_url` points at this config's own user pool.
    #[must_use]
    pub fn discovery_url_matches_pool(&self) -> bool {
        self.discovery_url.contains(&self.user_pool.user_pool_id)
    }

    /// Test-user login name, if one is configured.
    #[must_use]
    pub fn test_username(&self) -> Option<&str> {
        self.test_user.as_ref().and_then(TestUser::login_name)
    }
}

// ── Parsing ──────────────────────────────────────────────────────────────────

/// Parse and validate the raw file contents.
///
/// `origin` is only used in error messages (normally the file path).
///
/// # Errors
///
/// Returns [`ConfigError::Malformed`] if `content` is not a JSON object and
/// [`ConfigError::MissingKey`] for the first absent or empty required key.
pub fn parse_config(origin: &str, content: &str) -> Result<CognitoTestConfig, ConfigError> {
    let value: Value = serde_json::from_str(content).map_err(|e| ConfigError::Malformed {
        path: origin.to_string(),
        reason: e.to_string(),
    })?;
    if !value.is_object() {
        return Err(ConfigError::Malformed {
            path: origin.to_string(),
            reason: "top level must be a JSON object".to_string(),
        });
    }

    for key in REQUIRED_KEYS {
        let present = lookup(&value, key)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty());
        if !present {
            return Err(ConfigError::MissingKey {
                path: origin.to_string(),
                key: (*key).to_string(),
            });
        }
    }

    serde_json::from_value(value).map_err(|e| ConfigError::Malformed {
        path: origin.to_string(),
        reason: e.to_string(),
    })
}

/// Resolve a dotted key (`app_client.client_id`) inside a JSON value.
fn lookup<'a>(value: &'a Value, dotted: &str) -> Option<&'a Value> {
    dotted
        .split('.')
        .try_fold(value, |current, segment| current.get(segment))
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<(), ConfigError> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        });
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// Values are checked, never normalised: what passes is stored verbatim.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    if value.trim().is_empty() || value.chars().any(char::is_whitespace) {
        return Err(invalid("Value must be non-empty and contain no whitespace."));
    }

    match key {
        "discovery_url" if !value.starts_with("https://") => {
            Err(invalid("Discovery URL must use https://"))
        }
        "region" if !is_region(value) => Err(invalid("Expected an AWS region such as us-east-1.")),
        _ => Ok(()),
    }
}

fn is_region(value: &str) -> bool {
    let parts: Vec<&str> = value.split('-').collect();
    parts.len() >= 3
        && parts[0].len() == 2
        && parts[..parts.len() - 1]
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_lowercase()))
        && parts[parts.len() - 1].chars().all(|c| c.is_ascii_digit())
        && !parts[parts.len() - 1].is_empty()
}

/// Apply a validated key/value to the config in place.
///
/// # Errors
///
/// Returns an error if the key or value fails validation.
pub fn apply_config_value(
    config: &mut CognitoTestConfig,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    validate_config_key(key)?;
    validate_config_value(key, value)?;

    let value = value.to_string();
    match key {
        "discovery_url" => config.discovery_url = value,
        "region" => config.region = value,
        "app_client.client_id" => config.app_client.client_id = value,
        "user_pool.user_pool_id" => config.user_pool.user_pool_id = value,
        "test_user.username" => {
            config.test_user.get_or_insert_with(TestUser::default).username = Some(value);
        }
        _ => {
            return Err(ConfigError::UnknownKey {
                key: key.to_string(),
                valid: VALID_CONFIG_KEYS.join(", "),
            });
        }
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
