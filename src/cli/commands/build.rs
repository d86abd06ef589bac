//! Build command implementation
//!
//! Implements `appshell build` to compile the selected application and, for
//! production builds of applications with an app shell, pre-render the shell.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use thiserror::Error;

use crate::cli::output::{status, OutputConfig};
use crate::core::builder::{BuildOrchestrator, BuildOutcome};
use crate::core::options::{BuildOptions, OutputHashing, Target};
use crate::core::selector::AppSelector;
use crate::core::workspace::Workspace;
use crate::infra::process::{CommandBuildTask, CommandRenderTask, TaskReport};

/// The run was interrupted by the user
#[derive(Error, Debug)]
#[error("Build interrupted")]
pub struct Interrupted;

/// Build flags shared by `build` and `check`
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Build target (development, production)
    #[arg(short, long)]
    pub target: Option<Target>,

    /// Shortcut for --target=production
    #[arg(long, conflicts_with = "target")]
    pub prod: bool,

    /// Build environment name
    #[arg(short, long)]
    pub environment: Option<String>,

    /// Output path, overriding the apps' out_dir
    #[arg(long)]
    pub output_path: Option<PathBuf>,

    /// Application name or index
    #[arg(short, long)]
    pub app: Option<AppSelector>,

    /// Ahead-of-time compilation
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub aot: Option<bool>,

    /// Emit source maps
    #[arg(long, visible_alias = "sm", num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub sourcemaps: Option<bool>,

    /// Put third-party code in a separate vendor bundle
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub vendor_chunk: Option<bool>,

    /// Put code shared by lazy chunks in a common bundle
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub common_chunk: Option<bool>,

    /// Base href of the index document
    #[arg(long)]
    pub base_href: Option<String>,

    /// URL prefix for deployed assets
    #[arg(short, long)]
    pub deploy_url: Option<String>,

    /// Report build progress
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub progress: Option<bool>,

    /// Translation file
    #[arg(long)]
    pub i18n_file: Option<String>,

    /// Translation file format
    #[arg(long)]
    pub i18n_format: Option<String>,

    /// Locale
    #[arg(long)]
    pub locale: Option<String>,

    /// How to handle missing translations
    #[arg(long)]
    pub missing_translation: Option<String>,

    /// Extract CSS into separate files
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub extract_css: Option<bool>,

    /// Output hashing (none, all, media, bundles)
    #[arg(long)]
    pub output_hashing: Option<OutputHashing>,

    /// Delete the output path before building
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub delete_output_path: Option<bool>,

    /// Resolve symlinks to their real path
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub preserve_symlinks: Option<bool>,

    /// Extract third-party licenses into a separate file
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub extract_licenses: Option<bool>,

    /// Warn about circular dependencies
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub show_circular_dependencies: Option<bool>,

    /// Enable the build optimizer
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub build_optimizer: Option<bool>,

    /// Name lazy chunks after their source
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub named_chunks: Option<bool>,

    /// Emit subresource integrity hashes
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub subresource_integrity: Option<bool>,

    /// Generate a service worker
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub service_worker: Option<bool>,

    /// Do not render the app shell
    #[arg(long)]
    pub skip_app_shell: bool,

    /// Bundle dependencies of server builds (none, all)
    #[arg(long)]
    pub bundle_dependencies: Option<String>,

    /// Write a stats.json for bundle analysis
    #[arg(long)]
    pub stats_json: bool,

    /// Type-check in a forked process
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub fork_type_checker: Option<bool>,
}

impl BuildArgs {
    /// Convert the parsed flags into build options
    pub fn into_options(self, verbose: bool) -> BuildOptions {
        let target = if self.prod {
            Target::Production
        } else {
            self.target.unwrap_or_default()
        };

        BuildOptions {
            target,
            environment: self.environment,
            output_path: self.output_path,
            aot: self.aot,
            sourcemaps: self.sourcemaps,
            vendor_chunk: self.vendor_chunk,
            common_chunk: self.common_chunk,
            base_href: self.base_href,
            deploy_url: self.deploy_url,
            verbose,
            progress: self.progress,
            i18n_file: self.i18n_file,
            i18n_format: self.i18n_format,
            locale: self.locale,
            missing_translation: self.missing_translation,
            extract_css: self.extract_css,
            output_hashing: self.output_hashing,
            app: self.app,
            delete_output_path: self.delete_output_path,
            preserve_symlinks: self.preserve_symlinks,
            extract_licenses: self.extract_licenses,
            show_circular_dependencies: self.show_circular_dependencies,
            build_optimizer: self.build_optimizer,
            named_chunks: self.named_chunks,
            subresource_integrity: self.subresource_integrity,
            service_worker: self.service_worker,
            skip_app_shell: self.skip_app_shell,
            bundle_dependencies: self.bundle_dependencies,
            stats_json: self.stats_json,
            fork_type_checker: self.fork_type_checker,
        }
    }
}

/// Result of a build printed to the user
#[derive(Debug, Serialize)]
struct BuildSummary {
    /// Client application
    app: String,
    /// Whether the app shell was rendered
    app_shell: bool,
    /// Index document holding the rendered shell
    shell_index: Option<PathBuf>,
    /// Report of the stage that produced the final result
    result: TaskReport,
}

/// Execute the build command
pub async fn execute(project_dir: &Path, args: BuildArgs, output: &OutputConfig) -> Result<()> {
    let workspace = Workspace::load(project_dir).context("Failed to load workspace")?;
    let options = args
        .into_options(output.verbose > 0)
        .with_defaults(&workspace.defaults.build);

    let Some(build_command) = workspace.tasks.build.clone() else {
        bail!("No build command configured. Add a [tasks.build] section to appshell.toml");
    };
    let render_command = workspace.tasks.render.clone();
    let has_render_command = render_command.is_some();
    let guard = workspace.requirements.guard();

    let orchestrator = BuildOrchestrator::new(
        project_dir,
        workspace,
        guard,
        CommandBuildTask::new(build_command, project_dir),
        CommandRenderTask::new(render_command, project_dir),
    );

    let plan = orchestrator.plan(options)?;
    if plan.shell.is_some() && !has_render_command {
        bail!(
            "App '{}' declares an app shell but no render command is configured. \
             Add a [tasks.render] section to appshell.toml or pass --skip-app-shell",
            plan.client_name()
        );
    }

    let app = plan.client_name();
    let shell_index = plan
        .shell
        .as_ref()
        .map(|shell| shell.render.output_index_path.clone());

    let outcome = tokio::select! {
        outcome = orchestrator.execute(plan) => outcome?,
        _ = tokio::signal::ctrl_c() => return Err(Interrupted.into()),
    };

    let summary = match outcome {
        BuildOutcome::Client(report) => BuildSummary {
            app,
            app_shell: false,
            shell_index: None,
            result: report,
        },
        BuildOutcome::Shell(report) => BuildSummary {
            app,
            app_shell: true,
            shell_index,
            result: report,
        },
    };

    if output.json(&summary)? {
        return Ok(());
    }

    output.line(&format!(
        "{} Build complete: app '{}' ({} ms)",
        status::SUCCESS,
        summary.app,
        summary.result.elapsed_ms
    ));
    if let Some(index) = &summary.shell_index {
        output.line(&format!(
            "  App shell for route '{}' rendered into {}",
            summary.result.target,
            index.display()
        ));
    }

    Ok(())
}
