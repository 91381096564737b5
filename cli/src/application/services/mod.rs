//! Application services: use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports`, never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod auth;
pub mod config_service;
pub mod configure;
pub mod launch;
pub mod poll;
pub mod smoke;
pub mod status;
pub mod verify;
