//! Process-backed build and render tasks
//!
//! Runs the external commands configured under `[tasks]` in appshell.toml.
//! Build options and render inputs reach the child through its environment.
//! A child still running when its task future is dropped gets killed, so
//! cancelling a run aborts the stage in progress.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::defaults;
use crate::core::options::BuildOptions;
use crate::core::task::{RenderRequest, Task};
use crate::core::workspace::TaskCommand;

/// Summary of a finished task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskReport {
    /// Application selector for builds, route for renders
    pub target: String,
    /// Exit code of the finished process
    pub exit_code: Option<i32>,
    /// Stderr lines of the successful run
    pub warnings: Vec<String>,
    /// Wall-clock duration in milliseconds
    pub elapsed_ms: u128,
}

/// Build task running an external compiler command
#[derive(Debug, Clone)]
pub struct CommandBuildTask {
    command: TaskCommand,
    project_root: PathBuf,
}

impl CommandBuildTask {
    /// Create a build task running `command` inside `project_root`
    pub fn new(command: TaskCommand, project_root: &Path) -> Self {
        Self {
            command,
            project_root: project_root.to_path_buf(),
        }
    }
}

#[async_trait]
impl Task<BuildOptions> for CommandBuildTask {
    type Output = TaskReport;

    async fn run(&self, input: BuildOptions) -> Result<TaskReport> {
        let options_json =
            serde_json::to_string(&input).context("Failed to encode build options")?;

        let mut extra_args = Vec::new();
        if let Some(app) = &input.app {
            extra_args.push("--app".to_string());
            extra_args.push(app.to_string());
        }

        let start = Instant::now();
        let completed = run_command(
            &self.command,
            &self.project_root,
            &extra_args,
            &[(defaults::BUILD_OPTIONS_ENV, options_json)],
        )
        .await?;

        Ok(TaskReport {
            target: input
                .app
                .map_or_else(|| "default".to_string(), |app| app.to_string()),
            exit_code: completed.exit_code,
            warnings: completed.stderr,
            elapsed_ms: start.elapsed().as_millis(),
        })
    }
}

/// Render task running an external app shell renderer
///
/// A project without app shells needs no render command; running the task
/// without one fails.
#[derive(Debug, Clone)]
pub struct CommandRenderTask {
    command: Option<TaskCommand>,
    project_root: PathBuf,
}

impl CommandRenderTask {
    /// Create a render task running `command` inside `project_root`
    pub fn new(command: Option<TaskCommand>, project_root: &Path) -> Self {
        Self {
            command,
            project_root: project_root.to_path_buf(),
        }
    }
}

#[async_trait]
impl Task<RenderRequest> for CommandRenderTask {
    type Output = TaskReport;

    async fn run(&self, input: RenderRequest) -> Result<TaskReport> {
        let Some(command) = &self.command else {
            bail!("No render command configured. Add a [tasks.render] section to appshell.toml");
        };

        let env = [
            (
                defaults::RENDER_INPUT_INDEX_ENV,
                input.input_index_path.display().to_string(),
            ),
            (defaults::RENDER_ROUTE_ENV, input.route.clone()),
            (
                defaults::RENDER_SERVER_OUT_DIR_ENV,
                input.server_out_dir.display().to_string(),
            ),
            (
                defaults::RENDER_OUTPUT_INDEX_ENV,
                input.output_index_path.display().to_string(),
            ),
        ];

        let start = Instant::now();
        let completed = run_command(command, &self.project_root, &[], &env).await?;

        Ok(TaskReport {
            target: input.route,
            exit_code: completed.exit_code,
            warnings: completed.stderr,
            elapsed_ms: start.elapsed().as_millis(),
        })
    }
}

/// A command that ran to a successful exit
#[derive(Debug)]
struct Completed {
    /// Exit code, absent when the child was ended by a signal
    exit_code: Option<i32>,
    /// Non-empty stderr lines, usually compiler warnings
    stderr: Vec<String>,
}

/// Run a configured command to completion, failing on a non-zero exit
///
/// Stdout is streamed into the debug log. Stderr is collected: on success
/// each line is logged as a warning, on failure its tail ends up in the
/// error.
async fn run_command(
    command: &TaskCommand,
    project_root: &Path,
    extra_args: &[String],
    env: &[(&str, String)],
) -> Result<Completed> {
    let program = which::which_in(
        &command.program,
        std::env::var_os("PATH"),
        project_root,
    )
    .with_context(|| format!("Program '{}' not found", command.program))?;

    tracing::debug!(
        "Running {} {:?} {:?} in {}",
        program.display(),
        command.args,
        extra_args,
        project_root.display()
    );

    let mut cmd = tokio::process::Command::new(&program);
    cmd.args(&command.args)
        .args(extra_args)
        .current_dir(project_root)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    for (key, value) in env {
        cmd.env(key, value);
    }

    let mut child = cmd
        .spawn()
        .with_context(|| format!("Failed to run '{}'", command.program))?;
    let stdout = child.stdout.take().context("Child stdout was not captured")?;
    let stderr = child.stderr.take().context("Child stderr was not captured")?;

    let name = command.program.as_str();
    let log_stdout = async {
        let mut lines = BufReader::new(stdout).split(b'\n');
        while let Some(line) = lines.next_segment().await? {
            tracing::debug!("{name}: {}", String::from_utf8_lossy(&line).trim_end());
        }
        Ok::<_, std::io::Error>(())
    };
    let collect_stderr = async {
        let mut lines = BufReader::new(stderr).split(b'\n');
        let mut collected = Vec::new();
        while let Some(line) = lines.next_segment().await? {
            let line = String::from_utf8_lossy(&line).trim_end().to_string();
            if !line.is_empty() {
                collected.push(line);
            }
        }
        Ok::<_, std::io::Error>(collected)
    };

    let (status, stdout_read, stderr_lines) = tokio::join!(child.wait(), log_stdout, collect_stderr);
    let status = status.with_context(|| format!("Failed to wait for '{name}'"))?;
    stdout_read.with_context(|| format!("Failed to read output of '{name}'"))?;
    let stderr_lines = stderr_lines.with_context(|| format!("Failed to read stderr of '{name}'"))?;

    if !status.success() {
        let tail = stderr_tail(&stderr_lines, defaults::STDERR_TAIL_LINES);
        if tail.is_empty() {
            bail!("'{name}' exited with {status}");
        }
        bail!("'{name}' exited with {status}:\n{tail}");
    }

    for line in &stderr_lines {
        tracing::warn!("{name}: {line}");
    }

    Ok(Completed {
        exit_code: status.code(),
        stderr: stderr_lines,
    })
}

/// Last `max_lines` stderr lines joined for an error message
fn stderr_tail(lines: &[String], max_lines: usize) -> String {
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::Target;
    use crate::core::selector::AppSelector;
    use tempfile::TempDir;

    fn sh(script: &str) -> TaskCommand {
        TaskCommand {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
        }
    }

    #[test]
    fn test_stderr_tail_keeps_last_lines() {
        let lines: Vec<String> = ["one", "two", "three"].map(String::from).to_vec();
        assert_eq!(stderr_tail(&lines, 2), "two\nthree");
        assert_eq!(stderr_tail(&lines, 10), "one\ntwo\nthree");
        assert_eq!(stderr_tail(&[], 3), "");
    }

    #[tokio::test]
    async fn test_successful_run_keeps_stderr_warnings() {
        let temp = TempDir::new().unwrap();
        let completed = run_command(
            &sh("echo 'WARNING in main.ts' >&2; echo >&2; echo compiled"),
            temp.path(),
            &[],
            &[],
        )
        .await
        .unwrap();
        assert_eq!(completed.exit_code, Some(0));
        assert_eq!(completed.stderr, vec!["WARNING in main.ts".to_string()]);
    }

    #[tokio::test]
    async fn test_dropped_build_kills_child() {
        let temp = TempDir::new().unwrap();
        let task = CommandBuildTask::new(sh("sleep 1; echo done > marker"), temp.path());

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(200),
            task.run(BuildOptions::default()),
        )
        .await;
        assert!(result.is_err());

        tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
        assert!(!temp.path().join("marker").exists());
    }

    #[tokio::test]
    async fn test_build_passes_app_and_options() {
        let temp = TempDir::new().unwrap();
        let task = CommandBuildTask::new(
            sh(r#"printf '%s %s' "$0" "$1" > args.txt; printf '%s' "$APPSHELL_BUILD_OPTIONS" > options.json"#),
            temp.path(),
        );
        let options = BuildOptions {
            app: Some(AppSelector::Name("server".to_string())),
            deploy_url: Some("/cdn/".to_string()),
            ..BuildOptions::new(Target::Production)
        };

        let report = task.run(options).await.unwrap();
        assert_eq!(report.target, "server");
        assert_eq!(report.exit_code, Some(0));
        assert!(report.warnings.is_empty());

        let args = std::fs::read_to_string(temp.path().join("args.txt")).unwrap();
        assert_eq!(args, "--app server");
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(temp.path().join("options.json")).unwrap())
                .unwrap();
        assert_eq!(json["deployUrl"], "/cdn/");
        assert_eq!(json["target"], "production");
        assert_eq!(json["app"], "server");
    }

    #[tokio::test]
    async fn test_build_failure_reports_stderr() {
        let temp = TempDir::new().unwrap();
        let task = CommandBuildTask::new(sh("echo 'ERROR in main.ts' >&2; exit 3"), temp.path());
        let err = task.run(BuildOptions::default()).await.unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("ERROR in main.ts"), "{msg}");
    }

    #[tokio::test]
    async fn test_missing_program() {
        let temp = TempDir::new().unwrap();
        let task = CommandBuildTask::new(
            TaskCommand {
                program: "appshell-definitely-missing-compiler".to_string(),
                args: Vec::new(),
            },
            temp.path(),
        );
        let err = task.run(BuildOptions::default()).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_render_without_command_fails() {
        let temp = TempDir::new().unwrap();
        let task = CommandRenderTask::new(None, temp.path());
        let request = RenderRequest {
            input_index_path: temp.path().join("index.html"),
            route: "/".to_string(),
            server_out_dir: temp.path().join("dist-server"),
            output_index_path: temp.path().join("index.html"),
        };
        let err = task.run(request).await.unwrap_err();
        assert!(err.to_string().contains("[tasks.render]"));
    }

    #[tokio::test]
    async fn test_render_receives_inputs() {
        let temp = TempDir::new().unwrap();
        let task = CommandRenderTask::new(
            Some(sh(r#"printf '%s|%s|%s' "$APPSHELL_INPUT_INDEX" "$APPSHELL_ROUTE" "$APPSHELL_SERVER_OUT_DIR" > "$APPSHELL_OUTPUT_INDEX""#)),
            temp.path(),
        );
        let output_index = temp.path().join("index.html");
        let request = RenderRequest {
            input_index_path: output_index.clone(),
            route: "/shell".to_string(),
            server_out_dir: temp.path().join("dist-server"),
            output_index_path: output_index.clone(),
        };

        let report = task.run(request).await.unwrap();
        assert_eq!(report.target, "/shell");

        let written = std::fs::read_to_string(&output_index).unwrap();
        assert_eq!(
            written,
            format!(
                "{}|/shell|{}",
                output_index.display(),
                temp.path().join("dist-server").display()
            )
        );
    }
}
