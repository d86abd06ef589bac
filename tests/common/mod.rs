//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary directory for test projects and provides
/// utilities for setting up test scenarios.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Create a project with the given workspace and tooling installed at
    /// versions that satisfy the default requirements
    pub fn with_workspace(workspace: &str) -> Self {
        let project = Self::new();
        project.create_file("appshell.toml", workspace);
        project.install_package("@angular/core", "4.4.6");
        project.install_package("typescript", "2.4.2");
        project
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Install a fake package under node_modules
    pub fn install_package(&self, package: &str, version: &str) {
        self.create_file(
            &format!("node_modules/{package}/package.json"),
            &format!(r#"{{ "name": "{package}", "version": "{version}" }}"#),
        );
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Lines the fake tasks appended to calls.log
    pub fn calls(&self) -> Vec<String> {
        if !self.file_exists("calls.log") {
            return Vec::new();
        }
        self.read_file("calls.log")
            .lines()
            .map(String::from)
            .collect()
    }

    /// Run appshell with the given arguments inside the project
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_appshell"))
            .current_dir(self.path())
            .env_remove("RUST_LOG")
            .env_remove("APPSHELL_PROJECT_DIR")
            .args(args)
            .output()
            .expect("Failed to execute appshell")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Fake build and render commands logging to calls.log
///
/// Builds write `dist*/index.html`; the render step overwrites the output
/// index document with `<shell route>`.
#[allow(dead_code)]
pub const FAKE_TASKS: &str = r#"
[tasks.build]
program = "sh"
args = ["-c", '''
echo "build ${1:-default}" >> calls.log
printf '%s' "$APPSHELL_BUILD_OPTIONS" > "options-${1:-default}.json"
if [ "${1:-default}" = "server" ]; then dir=dist-server; else dir=dist; fi
mkdir -p "$dir"
echo "<app-root></app-root>" > "$dir/index.html"
''']

[tasks.render]
program = "sh"
args = ["-c", '''
echo "render $APPSHELL_ROUTE" >> calls.log
echo "<shell $APPSHELL_ROUTE>" > "$APPSHELL_OUTPUT_INDEX"
''']
"#;

/// Client app with an app shell rendered by a server app
#[allow(dead_code)]
pub const SHELL_APPS: &str = r#"
[[apps]]
name = "client"
out_dir = "dist"

[apps.app_shell]
app = "server"
route = "/"

[[apps]]
name = "server"
out_dir = "dist-server"
platform = "server"
"#;

/// Single browser app without an app shell
#[allow(dead_code)]
pub const PLAIN_APP: &str = r#"
[[apps]]
name = "client"
out_dir = "dist"
"#;
