//! Async wrapper around a single external process invocation.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::error::ToolError;

/// Default per-process time budget (1 hour).
pub const DEFAULT_TIMEOUT_SECS: u64 = 3600;

/// Captured output of a successful process.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Stdout followed by stderr.
    pub fn combined(&self) -> String {
        let mut text = self.stdout.clone();
        if !text.is_empty() && !text.ends_with('\n') && !self.stderr.is_empty() {
            text.push('\n');
        }
        text.push_str(&self.stderr);
        text
    }
}

/// An external command with its arguments and time budget.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
    timeout_secs: u64,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    /// Short program name used in error messages.
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Human readable command line, for logs only.
    pub fn command_line(&self) -> String {
        let mut line = self.program.to_string_lossy().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    /// Runs the process to completion and captures its output.
    ///
    /// A non-zero exit status is returned as [`ToolError::Failed`] carrying
    /// everything the process wrote. The child is killed if the time budget
    /// runs out or if the returned future is dropped.
    pub async fn run(&self) -> Result<ToolOutput, ToolError> {
        debug!(command = %self.command_line(), "Running external tool");

        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let output = match timeout(
            Duration::from_secs(self.timeout_secs),
            child.wait_with_output(),
        )
        .await
        {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ToolError::Io {
                    program: self.program_name(),
                    source: e,
                })
            }
            Err(_) => {
                return Err(ToolError::Timeout {
                    program: self.program_name(),
                    timeout_secs: self.timeout_secs,
                })
            }
        };

        let captured = ToolOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !output.status.success() {
            return Err(ToolError::Failed {
                program: self.program_name(),
                code: output.status.code(),
                output: captured.combined(),
            });
        }

        Ok(captured)
    }

    fn spawn_error(&self, e: std::io::Error) -> ToolError {
        if e.kind() == std::io::ErrorKind::NotFound {
            ToolError::NotFound {
                program: self.program_name(),
                path: self.program.clone(),
            }
        } else {
            ToolError::Io {
                program: self.program_name(),
                source: e,
            }
        }
    }
}

/// Checks that a binary can be started by asking for its version.
pub async fn check_binary(path: &Path, version_flag: &str) -> Result<(), ToolError> {
    ToolCommand::new(path)
        .arg(version_flag)
        .timeout_secs(30)
        .run()
        .await
        .map(|_| ())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_captures_stdout() {
        let output = ToolCommand::new("sh")
            .args(["-c", "echo hello"])
            .run()
            .await
            .unwrap();
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_run_failure_carries_output() {
        let err = ToolCommand::new("sh")
            .args(["-c", "echo partial; echo broken >&2; exit 3"])
            .run()
            .await
            .unwrap_err();

        match err {
            ToolError::Failed {
                program,
                code,
                output,
            } => {
                assert_eq!(program, "sh");
                assert_eq!(code, Some(3));
                assert!(output.contains("partial"));
                assert!(output.contains("broken"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_timeout() {
        let err = ToolCommand::new("sh")
            .args(["-c", "sleep 5"])
            .timeout_secs(1)
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Timeout { timeout_secs: 1, .. }));
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let err = ToolCommand::new("/nonexistent/bin/yt-dlp")
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound { ref program, .. } if program == "yt-dlp"));
    }

    #[test]
    fn test_command_line() {
        let cmd = ToolCommand::new("ffmpeg").args(["-i", "in.m4a", "out.m4a"]);
        assert_eq!(cmd.command_line(), "ffmpeg -i in.m4a out.m4a");
        assert_eq!(cmd.arguments().len(), 3);
    }

    #[test]
    fn test_combined_output() {
        let output = ToolOutput {
            stdout: "a".to_string(),
            stderr: "b\n".to_string(),
        };
        assert_eq!(output.combined(), "a\nb\n");
    }
}
