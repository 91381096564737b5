//! Application service: configuration use-cases.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::config::{
    CognitoTestConfig, apply_config_value, validate_config_key, validate_config_value,
};

/// Load configuration.
pub fn load_config(store: &impl ConfigStore) -> Result<CognitoTestConfig> {
    store.load()
}

/// Rewrite one whitelisted key and save the whole file.
///
/// The file is loaded, changed in memory, and written back. Two processes
/// doing this at once race; the last writer wins.
///
/// # Errors
///
/// Returns a `ConfigError` for an unknown key or invalid value (the file is
/// left untouched), or any load/save failure.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<CognitoTestConfig> {
    validate_config_key(key)?;
    validate_config_value(key, value)?;

    let mut config = store.load()?;
    apply_config_value(&mut config, key, value)?;
    store.save(&config)?;
    tracing::debug!(key, path = %store.path().display(), "config value updated");
    Ok(config)
}

/// Warning text when the discovery URL points at a different user pool.
#[must_use]
pub fn discovery_mismatch(config: &CognitoTestConfig) -> Option<String> {
    if config.discovery_url_matches_pool() {
        None
    } else {
        Some(format!(
            "discovery_url does not reference user pool {}; expected {}",
            config.user_pool.user_pool_id,
            config.expected_discovery_url()
        ))
    }
}
