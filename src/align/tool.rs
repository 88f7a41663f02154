//! Running external binaries (ClustalW, MUSCLE, DNAML).
//!
//! Every invocation captures stdout/stderr, kills the child if the waiting
//! future is dropped (e.g. on timeout), and reports a non-zero exit with the
//! most useful text the tool printed.

use std::process::{Output, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Override for the ClustalW executable
pub const CLUSTALW_ENV_BIN: &str = "SONAR_CLUSTALW";
pub const DEFAULT_CLUSTALW_BIN: &str = "clustalw";

/// Override for the MUSCLE executable
pub const MUSCLE_ENV_BIN: &str = "SONAR_MUSCLE";
pub const DEFAULT_MUSCLE_BIN: &str = "muscle";

/// Override for the PHYLIP `dnaml` executable
pub const DNAML_ENV_BIN: &str = "SONAR_DNAML";
pub const DEFAULT_DNAML_BIN: &str = "dnaml";

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Could not execute '{tool}' (set {env_var} to override): {source}")]
    Spawn {
        tool: String,
        env_var: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("'{tool}' failed ({status}): {detail}")]
    Failed {
        tool: String,
        status: String,
        detail: String,
    },

    #[error("'{tool}' did not finish within {} s", .limit.as_secs())]
    TimedOut { tool: String, limit: Duration },

    #[error("IO error while talking to '{tool}': {source}")]
    Io {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

/// Pick the executable for a tool: explicit choice, then env var, then default
pub fn resolve_tool_executable(explicit: Option<&str>, env_var: &str, default: &str) -> String {
    if let Some(tool) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
        return tool.to_string();
    }

    std::env::var(env_var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// One configured external program
#[derive(Debug, Clone)]
pub struct ExternalTool {
    pub executable: String,
    /// Env var named in error messages so users know how to point at the tool
    pub env_var: &'static str,
    pub timeout: Option<Duration>,
}

impl ExternalTool {
    pub fn new(executable: impl Into<String>, env_var: &'static str) -> Self {
        Self {
            executable: executable.into(),
            env_var,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// A command for this tool; callers add arguments and working directory
    pub fn command(&self) -> Command {
        Command::new(&self.executable)
    }

    /// Run a prepared command to completion, optionally feeding it stdin.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::Spawn` if the program cannot start,
    /// `ToolError::TimedOut` if it exceeds the timeout (the child is killed),
    /// and `ToolError::Failed` if it exits unsuccessfully.
    pub async fn run(&self, mut command: Command, stdin: Option<&[u8]>) -> Result<Output, ToolError> {
        command
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("Running {:?}", command.as_std());

        let mut child = command.spawn().map_err(|source| ToolError::Spawn {
            tool: self.executable.clone(),
            env_var: self.env_var,
            source,
        })?;

        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            pipe.write_all(input).await.map_err(|source| self.io_error(source))?;
            // Closing stdin lets interactive tools such as dnaml see EOF
            drop(pipe);
        }

        let waiting = child.wait_with_output();
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, waiting)
                .await
                .map_err(|_| ToolError::TimedOut {
                    tool: self.executable.clone(),
                    limit,
                })?,
            None => waiting.await,
        }
        .map_err(|source| self.io_error(source))?;

        if !output.status.success() {
            return Err(ToolError::Failed {
                tool: self.executable.clone(),
                status: output.status.to_string(),
                detail: failure_detail(&output),
            });
        }

        Ok(output)
    }

    fn io_error(&self, source: std::io::Error) -> ToolError {
        ToolError::Io {
            tool: self.executable.clone(),
            source,
        }
    }
}

/// Prefer stderr, fall back to stdout, then to the bare exit status
fn failure_detail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !stderr.is_empty() {
        return stderr;
    }
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if !stdout.is_empty() {
        return stdout;
    }
    format!("exit status {}", output.status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_explicit_wins() {
        assert_eq!(
            resolve_tool_executable(Some("/opt/bin/clustalw2"), "SONAR_TEST_UNSET_VAR", "clustalw"),
            "/opt/bin/clustalw2"
        );
    }

    #[test]
    fn test_resolve_default() {
        assert_eq!(
            resolve_tool_executable(None, "SONAR_TEST_UNSET_VAR", "clustalw"),
            "clustalw"
        );
        assert_eq!(
            resolve_tool_executable(Some("  "), "SONAR_TEST_UNSET_VAR", "muscle"),
            "muscle"
        );
    }

    #[tokio::test]
    async fn test_missing_executable() {
        let tool = ExternalTool::new("sonar-no-such-tool-on-path", CLUSTALW_ENV_BIN);
        let result = tool.run(tool.command(), None).await;
        assert!(matches!(result, Err(ToolError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failure_reports_stderr() {
        let tool = ExternalTool::new("sh", CLUSTALW_ENV_BIN);
        let mut command = tool.command();
        command.arg("-c").arg("echo 'bad input' >&2; exit 3");

        match tool.run(command, None).await {
            Err(ToolError::Failed { detail, .. }) => assert_eq!(detail, "bad input"),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdin_is_delivered() {
        let tool = ExternalTool::new("cat", DNAML_ENV_BIN);
        let output = tool.run(tool.command(), Some(b"J\n7\nY\n")).await.unwrap();
        assert_eq!(output.stdout, b"J\n7\nY\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_tool() {
        let tool =
            ExternalTool::new("sleep", CLUSTALW_ENV_BIN).with_timeout(Some(Duration::from_millis(100)));
        let mut command = tool.command();
        command.arg("5");

        let result = tool.run(command, None).await;
        assert!(matches!(result, Err(ToolError::TimedOut { .. })));
    }
}
