//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod check;

use std::path::Path;

use anyhow::Result;
use clap::Subcommand;

use crate::cli::output::OutputConfig;
use build::BuildArgs;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the selected app and render its app shell
    Build(BuildArgs),

    /// Validate configuration and show the build stages without building
    Check(BuildArgs),
}

impl Commands {
    /// Run the command against a project directory
    pub async fn run(self, project_dir: &Path, output: &OutputConfig) -> Result<()> {
        match self {
            Self::Build(args) => build::execute(project_dir, args, output).await,
            Self::Check(args) => check::execute(project_dir, args, output).await,
        }
    }
}
