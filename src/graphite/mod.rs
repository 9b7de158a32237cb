//! Graphite gateway
//!
//! Stacked-branch operations through the `gt` CLI and its on-disk metadata.

mod cli;

pub use cli::{parse_branch_cache, GraphiteCli};

use crate::auth::AuthStatus;
use crate::error::Result;
use crate::types::PlatformConfig;
use async_trait::async_trait;
use std::path::Path;

/// Base URL of the Graphite web app
pub const GRAPHITE_APP_URL: &str = "https://app.graphite.com";

/// Graphite operations trait
#[async_trait]
pub trait GraphiteService: Send + Sync {
    /// Check whether `gt` has an auth token configured
    async fn check_auth(&self) -> Result<AuthStatus>;

    /// Parent branch recorded in Graphite's tracking metadata
    ///
    /// `git_common_dir` is where `gt` keeps its branch cache.
    async fn parent_branch(&self, git_common_dir: &Path, branch: &str) -> Result<Option<String>>;

    /// Squash the current branch into a single commit (`gt squash --no-edit`)
    async fn squash_branch(&self, cwd: &Path) -> Result<()>;

    /// Restack the current stack (`gt restack --no-interactive`)
    async fn restack(&self, cwd: &Path) -> Result<()>;

    /// Submit the current stack (`gt submit`)
    async fn submit_stack(&self, cwd: &Path, force: bool) -> Result<()>;
}

/// Graphite review URL for a PR
pub fn review_url(config: &PlatformConfig, pr_number: u64) -> String {
    format!(
        "{GRAPHITE_APP_URL}/github/pr/{}/{}/{pr_number}",
        urlencoding::encode(&config.owner),
        urlencoding::encode(&config.repo)
    )
}
