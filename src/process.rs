//! Subprocess execution for git, gh and gt
//!
//! Neither git nor gt expose structured failure codes for conflicts or push
//! rejections. Output is inspected here, once, and mapped to a
//! [`FailureReason`] so that callers match on variants instead of text.

use crate::error::{Error, Result};
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Captured output of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the process exited with status 0
    pub success: bool,
    /// Exit code, if the process was not killed by a signal
    pub code: Option<i32>,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl CommandOutput {
    /// stdout followed by stderr
    pub fn combined(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Why a command failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Merge, rebase, squash or restack stopped on conflicting changes
    Conflict(String),
    /// The remote refused the update
    Rejected(String),
    /// Anything else
    Other(String),
}

/// Which tool produced a failure, for error mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// git
    Git,
    /// Graphite CLI
    Graphite,
}

/// Classify a failed command by inspecting its combined output
pub fn classify_failure(output: &CommandOutput) -> FailureReason {
    let text = output.combined();
    let lower = text.to_lowercase();
    let message = text.trim().to_string();

    if lower.contains("conflict") {
        FailureReason::Conflict(message)
    } else if lower.contains("non-fast-forward") || lower.contains("rejected") {
        FailureReason::Rejected(message)
    } else {
        FailureReason::Other(message)
    }
}

impl FailureReason {
    /// Map to the library error for the tool that failed
    pub fn into_error(self, tool: Tool) -> Error {
        match self {
            Self::Conflict(msg) => Error::Conflict(msg),
            Self::Rejected(msg) => Error::PushRejected(msg),
            Self::Other(msg) => match tool {
                Tool::Git => Error::Git(msg),
                Tool::Graphite => Error::Graphite(msg),
            },
        }
    }
}

/// Run a command to completion and capture its output
#[instrument(skip_all, fields(program = %program, cwd = %cwd.display()))]
pub async fn run(program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput> {
    debug!("{program} {}", args.join(" "));

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
        .await?;

    let result = CommandOutput {
        success: output.status.success(),
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    };

    if !result.success {
        debug!(code = ?result.code, "command failed: {}", result.stderr.trim());
    }

    Ok(result)
}

/// Run a command and return trimmed stdout, mapping failure to a classified error
pub async fn run_checked(tool: Tool, args: &[&str], cwd: &Path) -> Result<String> {
    let program = match tool {
        Tool::Git => "git",
        Tool::Graphite => "gt",
    };
    let output = run(program, args, cwd).await?;
    if output.success {
        Ok(output.stdout.trim().to_string())
    } else {
        Err(classify_failure(&output).into_error(tool))
    }
}
