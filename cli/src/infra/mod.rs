//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: HTTP clients for the remote
//! APIs, request signing, process execution, and filesystem access.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod aws;
pub mod cognito;
pub mod command_runner;
pub mod config;
pub mod control_plane;
pub mod probe;
pub mod registry;
