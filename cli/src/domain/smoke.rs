//! Built-in smoke-test suites, run in declaration order.

use agentcore_common::Protocol;
use serde::Serialize;

use crate::domain::error::ConfigError;

/// A named list of prompts sent to a deployed runtime.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SmokeSuite {
    pub name: &'static str,
    pub description: &'static str,
    /// Protocol the prompts are written for.
    pub protocol: Protocol,
    pub prompts: &'static [&'static str],
}

pub const SUITES: &[SmokeSuite] = &[
    SmokeSuite {
        name: "restaurant",
        description: "Restaurant search by district and meal type",
        protocol: Protocol::Http,
        prompts: &[
            "Find restaurants in Central district",
            "Show me breakfast places in Tsim Sha Tsui",
            "I want dinner options in Causeway Bay and Wan Chai",
            "Recommend a lunch spot in Admiralty with good sentiment",
        ],
    },
    SmokeSuite {
        name: "mbti",
        description: "MBTI-based travel itinerary planning",
        protocol: Protocol::Http,
        prompts: &[
            "Plan a 3-day Hong Kong itinerary for an INFJ traveller",
            "Which attractions suit an ENFP personality?",
            "Suggest a relaxed morning route for an ISTJ visitor",
        ],
    },
    SmokeSuite {
        name: "knowledge-base",
        description: "Knowledge-base retrieval of tourist spots by personality type",
        protocol: Protocol::Http,
        prompts: &[
            "List tourist spots recommended for INTJ personalities",
            "What museums match an ISFP traveller?",
        ],
    },
    SmokeSuite {
        name: "mcp",
        description: "MCP handshake and tool listing",
        protocol: Protocol::Mcp,
        prompts: &["tools/list"],
    },
];

/// Comma-separated suite names for help and error text.
#[must_use]
pub fn suite_names() -> String {
    SUITES.iter().map(|s| s.name).collect::<Vec<_>>().join(", ")
}

/// Look up a suite by name.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] listing the valid names.
pub fn find_suite(name: &str) -> Result<&'static SmokeSuite, ConfigError> {
    SUITES
        .iter()
        .find(|s| s.name == name)
        .ok_or_else(|| ConfigError::InvalidValue {
            key: "--type".to_string(),
            value: name.to_string(),
            reason: format!("Valid types: {}", suite_names()),
        })
}

/// Suites to run for the given runtime protocol when `--comprehensive` is set.
#[must_use]
pub fn suites_for(protocol: Protocol) -> Vec<&'static SmokeSuite> {
    SUITES.iter().filter(|s| s.protocol == protocol).collect()
}
