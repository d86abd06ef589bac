//! Error types for appshell
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::version::VersionError;

/// Workspace configuration (appshell.toml) errors
#[derive(Error, Debug)]
pub enum WorkspaceError {
    /// Configuration file not found
    #[error("Workspace configuration not found at '{path}'")]
    NotFound { path: PathBuf },

    /// Configuration file could not be parsed
    #[error("Failed to parse '{path}': {error}")]
    Parse { path: PathBuf, error: String },

    /// IO error while reading the configuration
    #[error("IO error for '{path}': {error}")]
    Io { path: PathBuf, error: String },

    /// No applications declared
    #[error("Unable to find any apps in appshell.toml")]
    NoApplications,

    /// Configuration is structurally invalid
    #[error("Invalid workspace configuration: {message}")]
    Invalid { message: String },
}

/// Errors that terminate a build run
///
/// Every variant is fatal. The first one encountered aborts all remaining
/// stages and is returned to the caller unchanged.
#[derive(Error, Debug)]
pub enum BuildError {
    /// Installed framework or compiler does not meet the minimum version
    ///
    /// Also carries the checks that could not be evaluated: a missing
    /// package, an unparsable installed version or a malformed constraint in
    /// `[requirements]`. The wrapped [`VersionError`] tells them apart.
    #[error(transparent)]
    VersionTooLow(#[from] VersionError),

    /// Application selector did not match any configured application
    #[error("Unable to find app with name or index '{selector}'. Verify the apps in appshell.toml")]
    SelectorNotFound { selector: String },

    /// The app shell's companion application is not a server application
    #[error("Shell app '{app}' has platform \"{platform}\", expected \"server\"")]
    PlatformMismatch { app: String, platform: String },

    /// The external build task failed
    #[error("Build failed for app '{app}': {error}")]
    BuildFailed { app: String, error: String },

    /// The external render task failed
    #[error("Rendering app shell for route '{route}' failed: {error}")]
    RenderFailed { route: String, error: String },
}

/// Top-level appshell error type
#[derive(Error, Debug)]
pub enum AppshellError {
    /// Workspace error
    #[error("Workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    /// Build error
    #[error("{0}")]
    Build(#[from] BuildError),
}
