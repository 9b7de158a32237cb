//! Platform service for GitHub
//!
//! Provides the PR and Actions operations used by submission, landing and
//! workflow polling.

mod detection;
mod factory;
mod github;

pub use detection::{detect_platform, parse_repo_info};
pub use factory::create_platform_service;
pub use github::GitHubService;

use crate::auth::AuthStatus;
use crate::error::Result;
use crate::types::{PlatformConfig, PrUpdate, PullRequest, WorkflowRun};
use async_trait::async_trait;

/// Platform service trait for PR and workflow operations
///
/// The submit pipeline, landing and workflow polling only talk to GitHub
/// through this trait, so tests can swap in an in-memory fake.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Check whether the configured credentials are valid
    async fn check_auth(&self) -> Result<AuthStatus>;

    /// Find an existing open PR for a head branch
    async fn find_existing_pr(&self, head_branch: &str) -> Result<Option<PullRequest>>;

    /// Fetch a PR by number, `None` if it doesn't exist
    async fn get_pr(&self, pr_number: u64) -> Result<Option<PullRequest>>;

    /// Create a new PR
    async fn create_pr(&self, head: &str, base: &str, title: &str, body: &str)
    -> Result<PullRequest>;

    /// Update title, body or base of an existing PR
    async fn update_pr(&self, pr_number: u64, update: &PrUpdate) -> Result<PullRequest>;

    /// Squash-merge a PR
    async fn merge_pr(&self, pr_number: u64) -> Result<()>;

    /// Trigger a `workflow_dispatch` event on `git_ref`
    async fn dispatch_workflow(
        &self,
        workflow: &str,
        git_ref: &str,
        inputs: &serde_json::Value,
    ) -> Result<()>;

    /// Most recent runs of a workflow on a branch, newest first
    async fn list_workflow_runs(&self, workflow: &str, branch: &str) -> Result<Vec<WorkflowRun>>;

    /// Get the platform configuration
    fn config(&self) -> &PlatformConfig;
}
