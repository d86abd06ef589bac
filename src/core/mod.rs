//! Core business logic module
//!
//! This module contains the orchestration logic of appshell. Spawning
//! processes belongs in [`crate::infra`].
//!
//! # Submodules
//!
//! - [`builder`] - Build orchestration state machine
//! - [`check`] - Build planning without running tasks
//! - [`options`] - Build options and deploy URL normalization
//! - [`selector`] - Application selectors
//! - [`task`] - Collaborator interfaces (resolver, build and render tasks)
//! - [`version`] - Minimum tooling version checks
//! - [`workspace`] - Workspace configuration (appshell.toml)

pub mod builder;
pub mod check;
pub mod options;
pub mod selector;
pub mod task;
pub mod version;
pub mod workspace;
