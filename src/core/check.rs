//! Check command logic
//!
//! Validates the workspace and the tooling versions, then reports which
//! stages a build with the given options would run, without building.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::builder::{BuildOrchestrator, BuildPlan};
use crate::core::options::BuildOptions;
use crate::core::workspace::Workspace;
use crate::error::AppshellError;

/// Result of the check operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    /// Client application that would be built
    pub client: String,
    /// Stages that would run, in order
    pub stages: Vec<String>,
    /// Server application used for the app shell
    pub server: Option<String>,
    /// Route pre-rendered into the app shell
    pub route: Option<String>,
    /// Index document the app shell would overwrite
    pub shell_index: Option<PathBuf>,
    /// Deploy URL after normalization
    pub deploy_url: Option<String>,
}

impl From<&BuildPlan> for CheckReport {
    fn from(plan: &BuildPlan) -> Self {
        Self {
            client: plan.client_name(),
            stages: plan.stages().iter().map(ToString::to_string).collect(),
            server: plan
                .shell
                .as_ref()
                .map(|shell| shell.server.display_name(Some(&shell.server_selector))),
            route: plan.shell.as_ref().map(|shell| shell.render.route.clone()),
            shell_index: plan
                .shell
                .as_ref()
                .map(|shell| shell.render.output_index_path.clone()),
            deploy_url: plan.options.deploy_url.clone(),
        }
    }
}

/// Plan a build for the project without running any task
pub fn check(project_dir: &Path, options: BuildOptions) -> Result<CheckReport, AppshellError> {
    let workspace = Workspace::load(project_dir)?;
    let guard = workspace.requirements.guard();
    let options = options.with_defaults(&workspace.defaults.build);

    let orchestrator = BuildOrchestrator::new(project_dir, workspace, guard, (), ());
    let plan = orchestrator.plan(options)?;

    Ok(CheckReport::from(&plan))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::Target;
    use crate::error::{BuildError, WorkspaceError};
    use tempfile::TempDir;

    const WORKSPACE: &str = r#"
[[apps]]
name = "client"

[apps.app_shell]
app = "server"
route = "shell"

[[apps]]
name = "server"
out_dir = "dist-server"
platform = "server"

[defaults.build]
deploy_url = "https://cdn.example.com/assets"

[requirements.framework]
package = "framework"
version = ">=1.0.0"

[requirements.compiler]
package = "compiler"
version = ">=2.0.0"
"#;

    fn project(framework: &str, compiler: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("appshell.toml"), WORKSPACE).unwrap();
        for (package, version) in [("framework", framework), ("compiler", compiler)] {
            let dir = temp.path().join("node_modules").join(package);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(
                dir.join("package.json"),
                format!(r#"{{ "version": "{version}" }}"#),
            )
            .unwrap();
        }
        temp
    }

    #[test]
    fn test_check_reports_shell_stages() {
        let temp = project("1.2.0", "2.4.0");
        let report = check(temp.path(), BuildOptions::new(Target::Production)).unwrap();

        assert_eq!(report.client, "client");
        assert_eq!(
            report.stages,
            vec!["building client", "building server", "rendering"]
        );
        assert_eq!(report.server.as_deref(), Some("server"));
        assert_eq!(report.route.as_deref(), Some("shell"));
        assert_eq!(
            report.shell_index,
            Some(temp.path().join("dist").join("index.html"))
        );
        assert_eq!(
            report.deploy_url.as_deref(),
            Some("https://cdn.example.com/assets/")
        );
    }

    #[test]
    fn test_check_development_skips_shell() {
        let temp = project("1.2.0", "2.4.0");
        let report = check(temp.path(), BuildOptions::new(Target::Development)).unwrap();
        assert_eq!(report.stages, vec!["building client"]);
        assert!(report.server.is_none());
    }

    #[test]
    fn test_check_fails_on_old_compiler() {
        let temp = project("1.2.0", "1.9.0");
        let err = check(temp.path(), BuildOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            AppshellError::Build(BuildError::VersionTooLow(_))
        ));
    }

    #[test]
    fn test_check_without_workspace() {
        let temp = TempDir::new().unwrap();
        let err = check(temp.path(), BuildOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            AppshellError::Workspace(WorkspaceError::NotFound { .. })
        ));
    }
}
