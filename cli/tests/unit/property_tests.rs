//! Property-based tests for validation and URL building.
//!
//! Uses `proptest` to check invariants across many random inputs.

#![allow(clippy::expect_used)]

use proptest::prelude::*;

use agentcore_cli::domain::config::VALID_CONFIG_KEYS;
use agentcore_cli::domain::deployment::{invocation_url, validate_agent_name};
use agentcore_cli::domain::{validate_config_key, validate_config_value};

// ============================================================================
// validate_agent_name()
// ============================================================================

proptest! {
    /// Names built from the allowed alphabet and length are accepted.
    #[test]
    fn prop_well_formed_names_accepted(name in "[a-zA-Z][a-zA-Z0-9_]{0,47}") {
        prop_assert!(validate_agent_name(&name).is_ok(), "rejected: {}", name);
    }

    /// A leading digit or underscore is always rejected.
    #[test]
    fn prop_bad_first_char_rejected(name in "[0-9_][a-zA-Z0-9_]{0,20}") {
        prop_assert!(validate_agent_name(&name).is_err(), "accepted: {}", name);
    }

    /// Hyphens are not part of the alphabet.
    #[test]
    fn prop_hyphenated_names_rejected(left in "[a-z]{1,10}", right in "[a-z]{1,10}") {
        let name = format!("{left}-{right}");
        prop_assert!(validate_agent_name(&name).is_err(), "accepted: {}", name);
    }
}

#[test]
fn test_agent_name_length_limit() {
    let max = format!("a{}", "b".repeat(47));
    assert!(validate_agent_name(&max).is_ok());
    let over = format!("a{}", "b".repeat(48));
    assert!(validate_agent_name(&over).is_err());
}

// ============================================================================
// validate_config_key() and validate_config_value()
// ============================================================================

proptest! {
    /// Keys outside the whitelist are rejected.
    #[test]
    fn prop_arbitrary_keys_rejected(key in "[a-z_]{1,20}(\\.[a-z_]{1,20})?") {
        if !VALID_CONFIG_KEYS.contains(&key.as_str()) {
            prop_assert!(validate_config_key(&key).is_err(), "accepted invalid key: {key}");
        }
    }

    /// Values with embedded whitespace are rejected for every key.
    #[test]
    fn prop_whitespace_values_rejected(
        idx in 0..VALID_CONFIG_KEYS.len(),
        left in "[a-z]{1,10}",
        right in "[a-z]{1,10}",
    ) {
        let value = format!("https://{left} {right}");
        prop_assert!(validate_config_value(VALID_CONFIG_KEYS[idx], &value).is_err());
    }

    /// Any https URL without whitespace is a valid discovery URL.
    #[test]
    fn prop_https_discovery_urls_accepted(path in "[a-zA-Z0-9_./-]{1,60}") {
        let value = format!("https://{path}");
        prop_assert!(validate_config_value("discovery_url", &value).is_ok());
    }
}

// ============================================================================
// invocation_url()
// ============================================================================

proptest! {
    /// The ARN is always a single path segment: no raw `/` or `:` survive.
    #[test]
    fn prop_invocation_url_escapes_arn(
        account in "[0-9]{12}",
        id in "[a-zA-Z0-9_-]{1,30}",
    ) {
        let arn = format!("arn:aws:bedrock-agentcore:us-east-1:{account}:runtime/{id}");
        let url = invocation_url("https://data.example.test/", &arn);
        let segment = url
            .strip_prefix("https://data.example.test/runtimes/")
            .and_then(|rest| rest.strip_suffix("/invocations?qualifier=DEFAULT"))
            .expect("url shape");
        prop_assert!(!segment.contains('/'), "unescaped slash: {}", url);
        prop_assert!(!segment.contains(':'), "unescaped colon: {}", url);
        prop_assert!(segment.ends_with(&id), "id lost: {}", url);
    }
}
