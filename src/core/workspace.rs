//! Workspace configuration (appshell.toml)
//!
//! Declares the project's applications, project-level build defaults,
//! minimum tooling versions and the external build/render commands.
//! Loaded once and handed to the orchestrator as its [`ConfigResolver`].

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::core::options::BuildDefaults;
use crate::core::selector::AppSelector;
use crate::core::task::ConfigResolver;
use crate::core::version::{InstalledPackageGuard, PackageRequirement};
use crate::error::{BuildError, WorkspaceError};

/// Platform an application is built for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Runs in the browser
    #[default]
    Browser,
    /// Runs on the server; used to pre-render the app shell
    Server,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Browser => write!(f, "browser"),
            Self::Server => write!(f, "server"),
        }
    }
}

/// App shell declared by a client application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellDescriptor {
    /// Application producing the server bundle used to render the shell
    pub app: AppSelector,
    /// Route to pre-render
    pub route: String,
}

/// One application of the workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDescriptor {
    /// Application name
    #[serde(default)]
    pub name: Option<String>,

    /// Source root
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Output directory, relative to the project root
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Index document, relative to the source root
    #[serde(default = "default_index")]
    pub index: String,

    /// Target platform
    #[serde(default)]
    pub platform: Platform,

    /// Pre-rendered app shell
    #[serde(default)]
    pub app_shell: Option<ShellDescriptor>,
}

fn default_root() -> PathBuf {
    PathBuf::from(defaults::DEFAULT_APP_ROOT)
}

fn default_out_dir() -> PathBuf {
    PathBuf::from(defaults::DEFAULT_OUT_DIR)
}

fn default_index() -> String {
    defaults::DEFAULT_INDEX.to_string()
}

impl ApplicationDescriptor {
    /// Create a browser application writing to `out_dir`
    pub fn browser(name: &str, out_dir: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            root: default_root(),
            out_dir: PathBuf::from(out_dir),
            index: default_index(),
            platform: Platform::Browser,
            app_shell: None,
        }
    }

    /// Create a server application writing to `out_dir`
    pub fn server(name: &str, out_dir: &str) -> Self {
        Self {
            platform: Platform::Server,
            ..Self::browser(name, out_dir)
        }
    }

    /// Declare an app shell rendered by `server_app` at `route`
    #[must_use]
    pub fn with_app_shell(mut self, server_app: &str, route: &str) -> Self {
        self.app_shell = Some(ShellDescriptor {
            app: AppSelector::parse(server_app),
            route: route.to_string(),
        });
        self
    }

    /// Name for messages; unnamed applications fall back to the selector
    pub fn display_name(&self, selector: Option<&AppSelector>) -> String {
        match (&self.name, selector) {
            (Some(name), _) => name.clone(),
            (None, Some(selector)) => selector.to_string(),
            (None, None) => "0".to_string(),
        }
    }

    /// Directory the build writes into
    ///
    /// An explicit output path overrides the configured `out_dir`.
    pub fn effective_out_dir(&self, project_root: &Path, output_path: Option<&Path>) -> PathBuf {
        project_root.join(output_path.unwrap_or(self.out_dir.as_path()))
    }

    /// Index document produced by the build
    pub fn built_index_path(&self, project_root: &Path, output_path: Option<&Path>) -> PathBuf {
        let file_name = Path::new(&self.index)
            .file_name()
            .map_or_else(|| PathBuf::from(&self.index), PathBuf::from);
        self.effective_out_dir(project_root, output_path)
            .join(file_name)
    }
}

/// `[defaults]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceDefaults {
    /// Defaults for build flags
    #[serde(default)]
    pub build: BuildDefaults,
}

/// A package requirement as written in `[requirements]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementConfig {
    /// Package name
    pub package: String,
    /// Semver constraint
    pub version: String,
}

/// `[requirements]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirements {
    /// Framework requirement
    #[serde(default = "default_framework")]
    pub framework: RequirementConfig,

    /// Compiler requirement
    #[serde(default = "default_compiler")]
    pub compiler: RequirementConfig,
}

fn default_framework() -> RequirementConfig {
    RequirementConfig {
        package: defaults::FRAMEWORK_PACKAGE.to_string(),
        version: defaults::FRAMEWORK_CONSTRAINT.to_string(),
    }
}

fn default_compiler() -> RequirementConfig {
    RequirementConfig {
        package: defaults::COMPILER_PACKAGE.to_string(),
        version: defaults::COMPILER_CONSTRAINT.to_string(),
    }
}

impl Default for Requirements {
    fn default() -> Self {
        Self {
            framework: default_framework(),
            compiler: default_compiler(),
        }
    }
}

impl Requirements {
    /// Version guard enforcing these requirements
    pub fn guard(&self) -> InstalledPackageGuard {
        InstalledPackageGuard::new(
            PackageRequirement::new(&self.framework.package, &self.framework.version),
            PackageRequirement::new(&self.compiler.package, &self.compiler.version),
        )
    }
}

/// External command run by a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCommand {
    /// Program to execute
    pub program: String,

    /// Arguments passed before any task-specific arguments
    #[serde(default)]
    pub args: Vec<String>,
}

/// `[tasks]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Command compiling one application
    #[serde(default)]
    pub build: Option<TaskCommand>,

    /// Command rendering the app shell
    #[serde(default)]
    pub render: Option<TaskCommand>,
}

/// The workspace configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    /// Declared applications, in order
    #[serde(default)]
    pub apps: Vec<ApplicationDescriptor>,

    /// Project-level defaults
    #[serde(default)]
    pub defaults: WorkspaceDefaults,

    /// Minimum tooling versions
    #[serde(default)]
    pub requirements: Requirements,

    /// External task commands
    #[serde(default)]
    pub tasks: TasksConfig,
}

impl Workspace {
    /// Create a workspace with the given applications and default settings
    pub fn with_apps(apps: Vec<ApplicationDescriptor>) -> Self {
        Self {
            apps,
            defaults: WorkspaceDefaults::default(),
            requirements: Requirements::default(),
            tasks: TasksConfig::default(),
        }
    }

    /// Load `appshell.toml` from a project directory
    pub fn load(project_dir: &Path) -> Result<Self, WorkspaceError> {
        let path = project_dir.join(defaults::WORKSPACE_FILE);
        if !path.exists() {
            return Err(WorkspaceError::NotFound { path });
        }

        let content = std::fs::read_to_string(&path).map_err(|e| WorkspaceError::Io {
            path: path.clone(),
            error: e.to_string(),
        })?;

        let workspace = Self::from_toml(&content).map_err(|e| match e {
            WorkspaceError::Parse { error, .. } => WorkspaceError::Parse {
                path: path.clone(),
                error,
            },
            other => other,
        })?;

        tracing::debug!(
            "Loaded workspace from {} ({} apps)",
            path.display(),
            workspace.apps.len()
        );
        Ok(workspace)
    }

    /// Parse and validate workspace TOML
    pub fn from_toml(content: &str) -> Result<Self, WorkspaceError> {
        let workspace: Self = toml::from_str(content).map_err(|e| WorkspaceError::Parse {
            path: PathBuf::from(defaults::WORKSPACE_FILE),
            error: e.to_string(),
        })?;
        workspace.validate()?;
        Ok(workspace)
    }

    /// Check structural rules that serde cannot express
    pub fn validate(&self) -> Result<(), WorkspaceError> {
        if self.apps.is_empty() {
            return Err(WorkspaceError::NoApplications);
        }

        let mut seen = HashSet::new();
        for app in &self.apps {
            if let Some(name) = &app.name {
                if name.is_empty() {
                    return Err(WorkspaceError::Invalid {
                        message: "app name cannot be empty".to_string(),
                    });
                }
                if name.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(WorkspaceError::Invalid {
                        message: format!(
                            "app name '{name}' is all digits and would be read as an index"
                        ),
                    });
                }
                if !seen.insert(name.as_str()) {
                    return Err(WorkspaceError::Invalid {
                        message: format!("duplicate app name '{name}'"),
                    });
                }
            }
            if let Some(shell) = &app.app_shell {
                if shell.route.is_empty() {
                    return Err(WorkspaceError::Invalid {
                        message: format!(
                            "app shell of '{}' has an empty route",
                            app.display_name(None)
                        ),
                    });
                }
            }
        }

        Ok(())
    }
}

impl ConfigResolver for Workspace {
    fn resolve(&self, selector: Option<&AppSelector>) -> Result<ApplicationDescriptor, BuildError> {
        let found = match selector {
            None => self.apps.first(),
            Some(AppSelector::Index(index)) => self.apps.get(*index),
            Some(AppSelector::Name(name)) => self
                .apps
                .iter()
                .find(|app| app.name.as_deref() == Some(name.as_str())),
        };

        found.cloned().ok_or_else(|| BuildError::SelectorNotFound {
            selector: selector.map_or_else(|| "<default>".to_string(), ToString::to_string),
        })
    }
}
