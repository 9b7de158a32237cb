//! Merging a branch's PR and freeing its slot

use crate::error::{Error, Result};
use crate::git::GitGateway;
use crate::platform::PlatformService;
use crate::pool::{release_branch, PoolPaths, PoolState};
use crate::types::PullRequest;
use tracing::{info, instrument};

/// Result of landing a branch
#[derive(Debug, Clone)]
pub struct LandResult {
    /// The merged PR
    pub pr: PullRequest,
    /// Slot freed by the merge, if the branch held one
    pub released_slot: Option<String>,
    /// Pool state after release
    pub state: PoolState,
}

/// Squash-merge the open PR for `branch`, then release its slot
///
/// The slot is only released once the merge has succeeded.
#[instrument(skip(platform, git, paths, state))]
pub async fn land_branch(
    platform: &dyn PlatformService,
    git: &dyn GitGateway,
    paths: &PoolPaths,
    state: &PoolState,
    branch: &str,
) -> Result<LandResult> {
    let pr = platform
        .find_existing_pr(branch)
        .await?
        .ok_or_else(|| Error::PrNotFound(branch.to_string()))?;

    platform.merge_pr(pr.number).await?;
    info!("merged PR #{} for {branch}", pr.number);

    let (released_slot, state) = release_branch(git, paths, state, branch).await?;
    Ok(LandResult {
        pr,
        released_slot,
        state,
    })
}
