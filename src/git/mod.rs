//! Git gateway
//!
//! Abstracts the git operations the pool manager and submit pipeline need so
//! that tests can substitute an in-memory implementation.

mod cli;

pub use cli::{parse_worktree_list, GitCli};

use crate::error::Result;
use crate::types::{BranchDivergence, WorktreeInfo};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Remote used for pushes and divergence checks
pub const DEFAULT_REMOTE: &str = "origin";

/// Git operations trait
#[async_trait]
pub trait GitGateway: Send + Sync {
    /// Current branch of `cwd`, `None` on detached HEAD
    async fn current_branch(&self, cwd: &Path) -> Result<Option<String>>;

    /// Top-level directory of the repository containing `cwd`
    async fn repo_root(&self, cwd: &Path) -> Result<PathBuf>;

    /// Absolute git common dir, shared by every worktree of the repository
    async fn git_common_dir(&self, cwd: &Path) -> Result<PathBuf>;

    /// Trunk branch name (remote HEAD, falling back to main/master)
    async fn trunk_branch(&self, repo_root: &Path) -> Result<String>;

    /// All entries of git's worktree registry, root first
    async fn list_worktrees(&self, repo_root: &Path) -> Result<Vec<WorktreeInfo>>;

    /// Commit SHA a local branch points at, `None` if it doesn't exist
    async fn branch_head(&self, repo_root: &Path, branch: &str) -> Result<Option<String>>;

    /// Names of all local branches
    async fn local_branches(&self, repo_root: &Path) -> Result<Vec<String>>;

    /// Number of commits on HEAD not reachable from `base`
    async fn commits_ahead(&self, cwd: &Path, base: &str) -> Result<u32>;

    /// Compare `branch` with its remote tracking branch
    async fn divergence(&self, cwd: &Path, branch: &str) -> Result<BranchDivergence>;

    /// Fetch URL of `remote`
    async fn remote_url(&self, cwd: &Path, remote: &str) -> Result<String>;

    /// Update remote tracking refs from the default remote
    async fn fetch(&self, cwd: &Path) -> Result<()>;

    /// Rebase `branch` onto its remote tracking branch
    async fn pull_rebase(&self, cwd: &Path, branch: &str) -> Result<()>;

    /// Push `branch` to the default remote, setting upstream
    async fn push(&self, cwd: &Path, branch: &str, force: bool) -> Result<()>;

    /// Check out an existing branch in `cwd`
    async fn checkout(&self, cwd: &Path, branch: &str) -> Result<()>;

    /// Create a branch at `start_point` without checking it out
    async fn create_branch(&self, repo_root: &Path, branch: &str, start_point: &str)
    -> Result<()>;

    /// Add a linked worktree at `path` with `branch` checked out
    async fn add_worktree(&self, repo_root: &Path, path: &Path, branch: &str) -> Result<()>;

    /// Full message of the HEAD commit
    async fn head_commit_message(&self, cwd: &Path) -> Result<String>;

    /// Diff of HEAD against the merge base with `base`
    async fn diff_against(&self, cwd: &Path, base: &str) -> Result<String>;
}
