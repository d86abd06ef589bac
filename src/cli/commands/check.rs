//! Check command implementation
//!
//! Implements `appshell check` to validate the workspace and tooling versions
//! and show which stages a build would run.

use std::path::Path;

use anyhow::Result;

use crate::cli::commands::build::BuildArgs;
use crate::cli::output::{status, OutputConfig};
use crate::core::check;

/// Execute the check command
pub async fn execute(project_dir: &Path, args: BuildArgs, output: &OutputConfig) -> Result<()> {
    let report = check::check(project_dir, args.into_options(output.verbose > 0))?;

    if output.json(&report)? {
        return Ok(());
    }

    output.line(&format!("{} Configuration is valid", status::SUCCESS));
    output.line(&format!("  App: {}", report.client));
    output.line(&format!("  Stages: {}", report.stages.join(" -> ")));
    if let (Some(server), Some(route)) = (&report.server, &report.route) {
        output.line(&format!("  App shell: route '{route}' rendered with '{server}'"));
    }
    if let Some(url) = &report.deploy_url {
        output.line(&format!("  Deploy URL: {url}"));
    }

    Ok(())
}
