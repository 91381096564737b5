//! Unit tests for the agentcore CLI
//!
//! These tests use mocked ports or a local HTTP server and run without
//! touching real cloud services.

mod architecture;
mod launch_service;
mod mocks;
mod property_tests;
