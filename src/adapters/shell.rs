//! Shell builder: runs a project's build command through the platform shell.
//!
//! The command string is handed to `sh -c` (or `cmd /C` on Windows) so that
//! entries like `mvn clean package` resolve against the caller's PATH.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::domain::{BuildOutcome, BuildStatus};

use super::Builder;

/// Builder that spawns the configured command in the project directory
#[derive(Debug, Clone, Default)]
pub struct ShellBuilder {
    /// Capture stdout/stderr instead of inheriting the caller's streams
    capture_output: bool,

    /// Kill the build after this long (None waits indefinitely)
    timeout: Option<Duration>,
}

impl ShellBuilder {
    /// Create a builder that inherits stdio and never times out
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capture_output(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether the build talks to the caller's terminal (prompts included)
    pub fn inherits_stdio(&self) -> bool {
        !self.capture_output
    }

    fn shell_command(command: &str) -> Command {
        #[cfg(windows)]
        {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", command]);
            cmd
        }
        #[cfg(not(windows))]
        {
            let mut cmd = Command::new("sh");
            cmd.args(["-c", command]);
            cmd
        }
    }
}

#[async_trait]
impl Builder for ShellBuilder {
    async fn run_build(&self, project: &str, dir: &Path, command: &str) -> BuildOutcome {
        info!(project, dir = %dir.display(), command, "Running build");
        let started = Instant::now();

        let mut cmd = Self::shell_command(command);
        cmd.current_dir(dir).kill_on_drop(true);
        if self.inherits_stdio() {
            cmd.stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit());
        } else {
            cmd.stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());
        }

        // A timed build gets its own process group so everything the shell
        // forked can be killed together. Untimed builds stay in the
        // foreground group and keep receiving Ctrl-C from the terminal.
        if self.timeout.is_some() {
            isolate_process_group(&mut cmd);
        }

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(project, error = %e, "Failed to spawn build");
                return BuildOutcome {
                    project: project.to_string(),
                    command: command.to_string(),
                    status: BuildStatus::SpawnFailed {
                        error: e.to_string(),
                    },
                    elapsed: started.elapsed(),
                    stdout: None,
                    stderr: None,
                };
            }
        };

        let pgid = child.id();

        // Dropping the future on timeout drops the child, which kills the shell
        let waited = match self.timeout {
            Some(limit) => match timeout(limit, child.wait_with_output()).await {
                Ok(result) => result,
                Err(_) => {
                    kill_process_group(project, pgid);
                    warn!(project, seconds = limit.as_secs(), "Build timed out");
                    return BuildOutcome {
                        project: project.to_string(),
                        command: command.to_string(),
                        status: BuildStatus::TimedOut {
                            seconds: limit.as_secs(),
                        },
                        elapsed: started.elapsed(),
                        stdout: None,
                        stderr: None,
                    };
                }
            },
            None => child.wait_with_output().await,
        };

        let elapsed = started.elapsed();
        match waited {
            Ok(output) => {
                let outcome =
                    BuildOutcome::exited(project, command, output.status.code(), elapsed);
                debug!(project, code = ?output.status.code(), ?elapsed, "Build finished");
                if self.capture_output {
                    outcome.with_output(
                        String::from_utf8_lossy(&output.stdout).into_owned(),
                        String::from_utf8_lossy(&output.stderr).into_owned(),
                    )
                } else {
                    outcome
                }
            }
            Err(e) => {
                warn!(project, error = %e, "Failed to wait for build");
                BuildOutcome {
                    project: project.to_string(),
                    command: command.to_string(),
                    status: BuildStatus::SpawnFailed {
                        error: e.to_string(),
                    },
                    elapsed,
                    stdout: None,
                    stderr: None,
                }
            }
        }
    }
}

#[cfg(unix)]
fn isolate_process_group(cmd: &mut Command) {
    cmd.process_group(0);
}

#[cfg(not(unix))]
fn isolate_process_group(_cmd: &mut Command) {}

/// Kill every process left in a timed-out build's group
#[cfg(unix)]
fn kill_process_group(project: &str, pgid: Option<u32>) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(pgid) = pgid else {
        return;
    };
    // ESRCH just means the group is already gone
    if let Err(e) = killpg(Pid::from_raw(pgid as i32), Signal::SIGKILL) {
        debug!(project, pgid, error = %e, "Could not signal build process group");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_project: &str, _pgid: Option<u32>) {}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_successful_build_runs_in_project_dir() {
        let temp = TempDir::new().unwrap();
        let builder = ShellBuilder::new().with_capture_output(true);

        let outcome = builder
            .run_build("runtime", temp.path(), "touch built.marker && echo done")
            .await;

        assert!(outcome.success());
        assert_eq!(outcome.stdout.as_deref(), Some("done\n"));
        assert!(temp.path().join("built.marker").exists());
    }

    #[test]
    fn test_stdin_inherited_unless_capturing() {
        assert!(ShellBuilder::new().inherits_stdio());
        assert!(!ShellBuilder::new().with_capture_output(true).inherits_stdio());
    }

    #[tokio::test]
    async fn test_captured_build_reads_empty_stdin() {
        let temp = TempDir::new().unwrap();
        let builder = ShellBuilder::new().with_capture_output(true);

        // Would block on a terminal if stdin were inherited
        let outcome = builder
            .run_build("agent", temp.path(), "cat; echo eof")
            .await;

        assert!(outcome.success());
        assert_eq!(outcome.stdout.as_deref(), Some("eof\n"));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_reported_not_raised() {
        let temp = TempDir::new().unwrap();
        let builder = ShellBuilder::new().with_capture_output(true);

        let outcome = builder
            .run_build("agent", temp.path(), "echo broken >&2; exit 3")
            .await;

        assert!(!outcome.success());
        assert_eq!(outcome.exit_code(), Some(3));
        assert_eq!(outcome.stderr.as_deref(), Some("broken\n"));
    }

    #[tokio::test]
    async fn test_missing_directory_is_spawn_failure() {
        let temp = TempDir::new().unwrap();
        let builder = ShellBuilder::new();

        let outcome = builder
            .run_build("compiler", &temp.path().join("nope"), "true")
            .await;

        assert!(matches!(outcome.status, BuildStatus::SpawnFailed { .. }));
    }

    #[tokio::test]
    async fn test_timeout_kills_build() {
        let temp = TempDir::new().unwrap();
        let builder = ShellBuilder::new().with_timeout(Some(Duration::from_millis(200)));

        let outcome = builder.run_build("compiler", temp.path(), "sleep 5").await;

        assert!(matches!(outcome.status, BuildStatus::TimedOut { .. }));
        assert!(outcome.elapsed < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_timeout_kills_forked_processes() {
        let temp = TempDir::new().unwrap();
        let builder = ShellBuilder::new().with_timeout(Some(Duration::from_millis(300)));

        // The inner shell is a grandchild of the build process
        let outcome = builder
            .run_build(
                "runtime",
                temp.path(),
                "sh -c 'sleep 1; touch late.jar'; true",
            )
            .await;
        assert!(matches!(outcome.status, BuildStatus::TimedOut { .. }));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!temp.path().join("late.jar").exists());
    }
}
