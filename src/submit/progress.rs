//! Progress callback trait for interface-agnostic updates
//!
//! The pipeline reports what it is doing through this trait so the CLI can
//! render it and tests can record it.

use crate::submit::state::SubmitError;
use crate::types::PullRequest;
use async_trait::async_trait;
use std::fmt;

/// Pipeline phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Verifying GitHub/Graphite credentials
    Authenticating,
    /// Reading the current and parent branch
    ResolvingBranch,
    /// Counting commits and checking the remote
    Inspecting,
    /// Rebasing onto the remote tracking branch
    Rebasing,
    /// Squashing commits with Graphite
    Squashing,
    /// Restacking with Graphite
    Restacking,
    /// Pushing the branch
    Pushing,
    /// Creating or updating the PR
    SubmittingPr,
    /// Writing and cleaning up scratch files
    Finalizing,
    /// Submission complete
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Authenticating => "Checking authentication",
            Self::ResolvingBranch => "Resolving branch",
            Self::Inspecting => "Inspecting branch",
            Self::Rebasing => "Rebasing",
            Self::Squashing => "Squashing commits",
            Self::Restacking => "Restacking",
            Self::Pushing => "Pushing",
            Self::SubmittingPr => "Submitting PR",
            Self::Finalizing => "Finalizing",
            Self::Complete => "Done",
        };
        f.write_str(label)
    }
}

/// Push operation status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushStatus {
    /// Push started
    Started,
    /// Push succeeded
    Success,
    /// Forced push succeeded
    Forced,
    /// Push failed with error message
    Failed(String),
}

impl fmt::Display for PushStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => f.write_str("pushing"),
            Self::Success => f.write_str("pushed"),
            Self::Forced => f.write_str("force-pushed"),
            Self::Failed(msg) => write!(f, "failed: {msg}"),
        }
    }
}

/// Progress callback trait
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called when entering a new phase
    async fn on_phase(&self, phase: Phase);

    /// Called around the branch push
    async fn on_push(&self, branch: &str, status: PushStatus);

    /// Called when a PR is created
    async fn on_pr_created(&self, branch: &str, pr: &PullRequest);

    /// Called when an existing PR is updated
    async fn on_pr_updated(&self, branch: &str, pr: &PullRequest);

    /// Called once with the terminal error when the pipeline stops early
    async fn on_error(&self, error: &SubmitError);

    /// Called with a general status message
    async fn on_message(&self, message: &str);
}

/// No-op progress callback for testing or when progress isn't needed
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_phase(&self, _phase: Phase) {}
    async fn on_push(&self, _branch: &str, _status: PushStatus) {}
    async fn on_pr_created(&self, _branch: &str, _pr: &PullRequest) {}
    async fn on_pr_updated(&self, _branch: &str, _pr: &PullRequest) {}
    async fn on_error(&self, _error: &SubmitError) {}
    async fn on_message(&self, _message: &str) {}
}
