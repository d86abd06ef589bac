//! Appshell - build orchestrator for front-end applications
//!
//! This library drives an external application compiler and, for
//! applications that declare a pre-rendered app shell, a server build and a
//! render step that writes the shell into the client's index document.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Orchestration logic and workspace configuration
//! - [`infra`] - Process-backed build and render tasks
//! - [`config`] - Configuration constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
