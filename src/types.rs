//! Core types for erk

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// An entry from git's worktree registry (`git worktree list --porcelain`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorktreeInfo {
    /// Absolute path to the worktree
    pub path: PathBuf,
    /// Checked-out branch, `None` when detached
    pub branch: Option<String>,
    /// Whether this is the main (root) worktree of the repository
    pub is_root: bool,
}

/// How a local branch relates to its remote tracking branch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BranchDivergence {
    /// Commits both ahead and behind
    pub is_diverged: bool,
    /// Local commits not on the remote
    pub ahead: u32,
    /// Remote commits not in the local branch
    pub behind: u32,
}

impl BranchDivergence {
    /// Build from ahead/behind counts
    pub const fn from_counts(ahead: u32, behind: u32) -> Self {
        Self {
            is_diverged: ahead > 0 && behind > 0,
            ahead,
            behind,
        }
    }
}

/// A pull request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Web URL for the PR
    pub html_url: String,
    /// Base branch name
    pub base_ref: String,
    /// Head branch name
    pub head_ref: String,
    /// PR title
    pub title: String,
    /// PR body (empty when unset)
    pub body: String,
}

/// Fields to change on an existing PR; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrUpdate {
    /// New title
    pub title: Option<String>,
    /// New body
    pub body: Option<String>,
    /// New base branch
    pub base: Option<String>,
}

/// A GitHub Actions workflow run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkflowRun {
    /// Run ID
    pub run_id: u64,
    /// Run status (`queued`, `in_progress`, `completed`)
    pub status: String,
    /// Conclusion once completed
    pub conclusion: Option<String>,
    /// Branch the run was triggered on
    pub branch: String,
    /// Head commit SHA
    pub head_sha: String,
    /// Title shown in the Actions UI
    pub display_title: String,
    /// When the run was created
    pub created_at: DateTime<Utc>,
}

/// Detected platform type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    /// GitHub or GitHub Enterprise
    GitHub,
}

/// Platform configuration
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Platform type
    pub platform: Platform,
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com)
    pub host: Option<String>,
}
