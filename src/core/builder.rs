//! Build orchestration logic
//!
//! Drives one build run: version checks, option normalization, application
//! resolution, the client build and, when an app shell is declared and
//! eligible, a server build followed by the shell render.
//!
//! Stages run strictly one after another. Each stage's output files are
//! complete before the next stage starts because the render step reads what
//! both builds wrote.

use std::fmt;
use std::path::PathBuf;

use crate::core::options::BuildOptions;
use crate::core::selector::AppSelector;
use crate::core::task::{ConfigResolver, RenderRequest, Task};
use crate::core::version::VersionGuard;
use crate::core::workspace::{ApplicationDescriptor, Platform};
use crate::error::BuildError;

/// Stage of a build run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Checking tooling versions
    Validating,
    /// Normalizing options
    Normalizing,
    /// Resolving applications
    Resolving,
    /// Building the client application
    BuildingClient,
    /// Building the shell's server application
    BuildingServer,
    /// Rendering the app shell
    Rendering,
    /// Run finished
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validating => write!(f, "validating"),
            Self::Normalizing => write!(f, "normalizing"),
            Self::Resolving => write!(f, "resolving"),
            Self::BuildingClient => write!(f, "building client"),
            Self::BuildingServer => write!(f, "building server"),
            Self::Rendering => write!(f, "rendering"),
            Self::Done => write!(f, "done"),
        }
    }
}

fn enter(stage: Stage) {
    tracing::debug!("Entering stage: {stage}");
}

/// Final value of a successful run
#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome<B, R> {
    /// No shell stage ran; the client build's result
    Client(B),
    /// The shell was rendered; the render result
    Shell(R),
}

/// Server half of a planned app shell
#[derive(Debug, Clone, PartialEq)]
pub struct ShellPlan {
    /// Selector of the server application
    pub server_selector: AppSelector,
    /// Resolved server application
    pub server: ApplicationDescriptor,
    /// Options for the server build
    pub server_options: BuildOptions,
    /// Inputs of the render step
    pub render: RenderRequest,
}

impl ShellPlan {
    /// Whether the server build writes into the client's output directory
    ///
    /// A server build that deletes its output path first also removes the
    /// client's index document before the render step reads it.
    pub fn shares_client_output(&self) -> bool {
        self.render.input_index_path.parent() == Some(self.render.server_out_dir.as_path())
    }
}

/// Everything decided before the first build starts
#[derive(Debug, Clone, PartialEq)]
pub struct BuildPlan {
    /// Normalized options for the client build
    pub options: BuildOptions,
    /// Resolved client application
    pub client: ApplicationDescriptor,
    /// Present only when a shell is declared and eligible
    pub shell: Option<ShellPlan>,
}

impl BuildPlan {
    /// Name of the client application for messages
    pub fn client_name(&self) -> String {
        self.client.display_name(self.options.app.as_ref())
    }

    /// Build stages this plan will execute, in order
    pub fn stages(&self) -> Vec<Stage> {
        if self.shell.is_some() {
            vec![Stage::BuildingClient, Stage::BuildingServer, Stage::Rendering]
        } else {
            vec![Stage::BuildingClient]
        }
    }
}

/// Build orchestrator
///
/// Owns no process-wide state. Concurrent runs against different projects
/// are independent; runs sharing an output directory must not overlap.
#[derive(Debug)]
pub struct BuildOrchestrator<C, V, B, R> {
    project_root: PathBuf,
    resolver: C,
    guard: V,
    build_task: B,
    render_task: R,
}

impl<C, V, B, R> BuildOrchestrator<C, V, B, R>
where
    C: ConfigResolver,
    V: VersionGuard,
{
    /// Create a new build orchestrator
    pub fn new(
        project_root: impl Into<PathBuf>,
        resolver: C,
        guard: V,
        build_task: B,
        render_task: R,
    ) -> Self {
        Self {
            project_root: project_root.into(),
            resolver,
            guard,
            build_task,
            render_task,
        }
    }

    /// Run every check and decision that precedes the client build
    pub fn plan(&self, options: BuildOptions) -> Result<BuildPlan, BuildError> {
        enter(Stage::Validating);
        self.guard
            .assert_minimum_framework_version(&self.project_root)?;
        self.guard
            .assert_minimum_compiler_version(&self.project_root)?;

        enter(Stage::Normalizing);
        let options = options.normalized();

        enter(Stage::Resolving);
        let client = self.resolver.resolve(options.app.as_ref())?;
        tracing::debug!("Resolved client app: {client:?}");

        let shell = match &client.app_shell {
            Some(declared) if options.shell_eligible() => {
                let server = self.resolver.resolve(Some(&declared.app))?;
                if server.platform != Platform::Server {
                    return Err(BuildError::PlatformMismatch {
                        app: server.display_name(Some(&declared.app)),
                        platform: server.platform.to_string(),
                    });
                }

                let output_path = options.output_path.as_deref();
                let client_index = client.built_index_path(&self.project_root, output_path);
                let render = RenderRequest {
                    input_index_path: client_index.clone(),
                    route: declared.route.clone(),
                    server_out_dir: server.effective_out_dir(&self.project_root, output_path),
                    output_index_path: client_index,
                };

                let shell = ShellPlan {
                    server_selector: declared.app.clone(),
                    server_options: options.for_app(declared.app.clone()),
                    server,
                    render,
                };
                if shell.shares_client_output() {
                    tracing::warn!(
                        "Client and server apps both build into {}; the server build may \
                         overwrite the client's index document (delete-output-path: {:?})",
                        shell.render.server_out_dir.display(),
                        options.delete_output_path
                    );
                }
                Some(shell)
            }
            Some(_) => {
                tracing::warn!(
                    "App shell skipped (target: {}, aot: {:?}, skip-app-shell: {})",
                    options.target,
                    options.aot,
                    options.skip_app_shell
                );
                None
            }
            None => None,
        };

        Ok(BuildPlan {
            options,
            client,
            shell,
        })
    }
}

impl<C, V, B, R> BuildOrchestrator<C, V, B, R>
where
    C: ConfigResolver,
    V: VersionGuard,
    B: Task<BuildOptions>,
    R: Task<RenderRequest>,
{
    /// Execute a full build run
    ///
    /// The first error aborts every remaining stage. Output already written
    /// by earlier stages is left in place.
    pub async fn run(
        &self,
        options: BuildOptions,
    ) -> Result<BuildOutcome<B::Output, R::Output>, BuildError> {
        let plan = self.plan(options)?;
        self.execute(plan).await
    }

    /// Execute the build stages of a plan produced by [`Self::plan`]
    pub async fn execute(
        &self,
        plan: BuildPlan,
    ) -> Result<BuildOutcome<B::Output, R::Output>, BuildError> {
        let client_name = plan.client_name();

        enter(Stage::BuildingClient);
        tracing::info!("Building app '{client_name}'");
        let client_result =
            self.build_task
                .run(plan.options)
                .await
                .map_err(|e| BuildError::BuildFailed {
                    app: client_name.clone(),
                    error: format!("{e:#}"),
                })?;

        let Some(shell) = plan.shell else {
            enter(Stage::Done);
            return Ok(BuildOutcome::Client(client_result));
        };

        enter(Stage::BuildingServer);
        let server_name = shell.server.display_name(Some(&shell.server_selector));
        tracing::info!("Building server app '{server_name}' for the app shell");
        self.build_task
            .run(shell.server_options)
            .await
            .map_err(|e| BuildError::BuildFailed {
                app: server_name,
                error: format!("{e:#}"),
            })?;

        enter(Stage::Rendering);
        let route = shell.render.route.clone();
        tracing::info!(
            "Rendering app shell for route '{route}' into {}",
            shell.render.output_index_path.display()
        );
        let rendered = self
            .render_task
            .run(shell.render)
            .await
            .map_err(|e| BuildError::RenderFailed {
                route,
                error: format!("{e:#}"),
            })?;

        enter(Stage::Done);
        Ok(BuildOutcome::Shell(rendered))
    }
}
