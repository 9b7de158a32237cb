//! Error types for erk

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Library error type
#[derive(Debug, Error)]
pub enum Error {
    /// Filesystem or subprocess spawn failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure outside of pool state loading
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A git command failed for a reason other than conflict or rejection
    #[error("git error: {0}")]
    Git(String),

    /// A gt command failed for a reason other than conflict
    #[error("graphite error: {0}")]
    Graphite(String),

    /// A git or gt operation stopped on a merge/rebase conflict
    #[error("conflict: {0}")]
    Conflict(String),

    /// The remote refused a push (non-fast-forward or otherwise rejected)
    #[error("push rejected: {0}")]
    PushRejected(String),

    /// GitHub API failure
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Authentication failure
    #[error("authentication error: {0}")]
    Auth(String),

    /// No GitHub remote could be found or parsed
    #[error("no supported remotes found (GitHub only)")]
    NoSupportedRemotes,

    /// Remote name not configured in the repository
    #[error("remote not found: {0}")]
    RemoteNotFound(String),

    /// `pool.json` exists but could not be parsed
    #[error("pool state at {path} is corrupt: {message}")]
    PoolStateCorrupt {
        /// Location of the pool file
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// Slot name is not part of the pool
    #[error("slot not found: {0}")]
    SlotNotFound(String),

    /// Slot already holds an assignment
    #[error("slot {slot} is already assigned to {branch}")]
    SlotOccupied {
        /// Slot name
        slot: String,
        /// Branch currently assigned
        branch: String,
    },

    /// No open PR for a branch
    #[error("no open PR for branch {0}")]
    PrNotFound(String),

    /// Every slot in the pool is assigned
    #[error("no available slot in pool of size {0}")]
    NoAvailableSlot(u32),

    /// Workflow run never appeared after dispatch
    #[error("workflow run for {workflow} on {branch} not found after {attempts} attempts{}", format_near_misses(.near_misses))]
    WorkflowRunNotFound {
        /// Workflow file name
        workflow: String,
        /// Branch the run was dispatched on
        branch: String,
        /// Attempts made before giving up
        attempts: u32,
        /// Runs observed on the last poll that did not match
        near_misses: Vec<String>,
    },

    /// Parse error
    #[error("parse error: {0}")]
    Parse(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

fn format_near_misses(near_misses: &[String]) -> String {
    if near_misses.is_empty() {
        return "; no runs observed".to_string();
    }
    let mut out = String::from("; observed runs:");
    for run in near_misses {
        out.push_str("\n  - ");
        out.push_str(run);
    }
    out
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        Self::GitHubApi(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_not_found_lists_near_misses() {
        let err = Error::WorkflowRunNotFound {
            workflow: "dispatch.yml".to_string(),
            branch: "feature".to_string(),
            attempts: 3,
            near_misses: vec!["run 1 on main (queued)".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("after 3 attempts"));
        assert!(msg.contains("run 1 on main (queued)"));
    }

    #[test]
    fn test_workflow_not_found_without_runs() {
        let err = Error::WorkflowRunNotFound {
            workflow: "dispatch.yml".to_string(),
            branch: "feature".to_string(),
            attempts: 1,
            near_misses: vec![],
        };
        assert!(err.to_string().ends_with("no runs observed"));
    }
}
