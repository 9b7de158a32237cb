//! Pipeline state and terminal errors

use crate::types::BranchDivergence;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// State threaded through the submit pipeline
///
/// Built once per invocation; each step returns an augmented copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitState {
    /// Directory the submit was invoked from
    pub cwd: PathBuf,
    /// Main worktree of the repository
    pub repo_root: PathBuf,
    /// Branch being submitted (set by branch resolution)
    pub branch_name: String,
    /// Branch the PR targets (set by parent resolution)
    pub parent_branch: String,
    /// Repository trunk
    pub trunk_branch: String,

    /// Use the Graphite-backed variant
    pub use_graphite: bool,
    /// Bypass the divergence check and force-push
    pub force: bool,
    /// Keep scratch files and report extra detail
    pub debug: bool,

    /// Scratch-file isolation key
    pub session_id: String,
    /// Linked plan/issue, referenced from the PR body
    pub issue_number: Option<u64>,

    /// Commits ahead of the parent branch
    pub commit_count: u32,
    /// Relation to the remote tracking branch
    #[serde(skip)]
    pub divergence: BranchDivergence,

    /// PR number
    pub pr_number: Option<u64>,
    /// PR web URL
    pub pr_url: Option<String>,
    /// Whether this run created the PR
    pub was_created: bool,
    /// Base branch of the PR
    pub base_branch: Option<String>,
    /// Graphite review URL
    pub graphite_url: Option<String>,
    /// Scratch file holding the branch diff
    pub diff_file: Option<PathBuf>,
    /// PR title override
    pub title: Option<String>,
    /// PR body override
    pub body: Option<String>,
}

impl SubmitState {
    /// Fresh state for a submit from `cwd`
    pub fn new(
        cwd: impl Into<PathBuf>,
        repo_root: impl Into<PathBuf>,
        trunk_branch: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            cwd: cwd.into(),
            repo_root: repo_root.into(),
            branch_name: String::new(),
            parent_branch: String::new(),
            trunk_branch: trunk_branch.into(),
            use_graphite: false,
            force: false,
            debug: false,
            session_id: session_id.into(),
            issue_number: None,
            commit_count: 0,
            divergence: BranchDivergence::default(),
            pr_number: None,
            pr_url: None,
            was_created: false,
            base_branch: None,
            graphite_url: None,
            diff_file: None,
            title: None,
            body: None,
        }
    }

    /// Whether the PR targets another feature branch
    pub fn is_stacked(&self) -> bool {
        !self.parent_branch.is_empty() && self.parent_branch != self.trunk_branch
    }
}

/// Closed set of pipeline failure tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitErrorKind {
    /// GitHub credentials rejected or unverifiable
    GithubAuthFailed,
    /// Graphite has no auth token
    GtNotAuthenticated,
    /// gh reports no logged-in user
    GhNotAuthenticated,
    /// Detached HEAD
    NoBranch,
    /// Graphite has no parent recorded for the branch
    NoParent,
    /// Nothing to submit
    NoCommits,
    /// Local and remote branches have diverged
    BranchDiverged,
    /// `gt restack` hit a conflict
    RestackConflict,
    /// `gt squash` hit a conflict
    SquashConflict,
    /// `gt squash` failed for another reason
    SquashFailed,
    /// Stacked parent has no open PR
    ParentBranchNoPr,
    /// Expected PR doesn't exist
    PrNotFound,
    /// PR could not be updated
    PrUpdateFailed,
    /// Final submit or scratch handling failed
    FinalizeFailed,
    /// Commit message generation failed
    AiGenerationFailed,
    /// Push failed for a reason other than rejection
    PushFailed,
    /// PR could not be created
    PrCreateFailed,
    /// A git or GitHub query failed unexpectedly
    CommandFailed,
}

impl SubmitErrorKind {
    /// Wire tag
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GithubAuthFailed => "github_auth_failed",
            Self::GtNotAuthenticated => "gt_not_authenticated",
            Self::GhNotAuthenticated => "gh_not_authenticated",
            Self::NoBranch => "no_branch",
            Self::NoParent => "no_parent",
            Self::NoCommits => "no_commits",
            Self::BranchDiverged => "branch_diverged",
            Self::RestackConflict => "restack_conflict",
            Self::SquashConflict => "squash_conflict",
            Self::SquashFailed => "squash_failed",
            Self::ParentBranchNoPr => "parent_branch_no_pr",
            Self::PrNotFound => "pr_not_found",
            Self::PrUpdateFailed => "pr_update_failed",
            Self::FinalizeFailed => "finalize_failed",
            Self::AiGenerationFailed => "ai_generation_failed",
            Self::PushFailed => "push_failed",
            Self::PrCreateFailed => "pr_create_failed",
            Self::CommandFailed => "command_failed",
        }
    }
}

impl fmt::Display for SubmitErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal pipeline failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{error_type}: {message}")]
pub struct SubmitError {
    /// Failure tag
    pub error_type: SubmitErrorKind,
    /// Human-readable summary
    pub message: String,
    /// Extra diagnostic fields
    pub details: BTreeMap<String, String>,
}

impl SubmitError {
    /// New error with no details
    pub fn new(error_type: SubmitErrorKind, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    /// Attach a diagnostic field
    #[must_use]
    pub fn with_detail(mut self, key: &str, value: impl ToString) -> Self {
        self.details.insert(key.to_string(), value.to_string());
        self
    }
}

/// Outcome of a single step
pub type StepResult = std::result::Result<SubmitState, SubmitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serializes_with_wire_tag() {
        let err = SubmitError::new(SubmitErrorKind::ParentBranchNoPr, "parent has no PR")
            .with_detail("parent_branch", "feat-a");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["error_type"], "parent_branch_no_pr");
        assert_eq!(json["details"]["parent_branch"], "feat-a");
        assert_eq!(err.to_string(), "parent_branch_no_pr: parent has no PR");
    }

    #[test]
    fn test_serde_tag_matches_as_str() {
        for kind in [
            SubmitErrorKind::GithubAuthFailed,
            SubmitErrorKind::GtNotAuthenticated,
            SubmitErrorKind::NoCommits,
            SubmitErrorKind::AiGenerationFailed,
        ] {
            assert_eq!(
                serde_json::to_string(&kind).unwrap(),
                format!("\"{}\"", kind.as_str())
            );
        }
    }

    #[test]
    fn test_is_stacked() {
        let mut state = SubmitState::new("/repo", "/repo", "main", "s1");
        assert!(!state.is_stacked());
        state.parent_branch = "main".to_string();
        assert!(!state.is_stacked());
        state.parent_branch = "feat-a".to_string();
        assert!(state.is_stacked());
    }
}
