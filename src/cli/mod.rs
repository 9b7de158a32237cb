//! CLI commands
//!
//! Command implementations for the `erk` binary.

mod auth;
mod land;
mod pool;
mod progress;
mod slot;
mod style;
mod submit;
mod workflow;

pub use auth::run_auth;
pub use land::run_land;
pub use pool::{run_pool_check, run_pool_status};
pub use slot::{run_slot_assign, run_slot_objective, run_slot_unassign};
pub use submit::{run_submit, SubmitArgs};
pub use workflow::run_workflow;

use erk::config::ErkConfig;
use erk::error::Result;
use erk::git::{GitCli, GitGateway, DEFAULT_REMOTE};
use erk::platform::{create_platform_service, parse_repo_info, PlatformService};
use erk::pool::{load_pool_state, PoolPaths, PoolState};
use std::path::{Path, PathBuf};

/// Options shared by every command
#[derive(Debug, Clone)]
pub struct GlobalOpts {
    /// Directory to run in
    pub path: PathBuf,
    /// Override for the erk home directory
    pub erk_home: Option<PathBuf>,
    /// Pool size for a new pool
    pub pool_size: Option<u32>,
    /// Emit JSON instead of styled text
    pub json: bool,
}

/// Repository the command runs against
pub(crate) struct RepoContext {
    pub git: GitCli,
    pub config: ErkConfig,
    pub paths: PoolPaths,
}

impl RepoContext {
    pub async fn open(opts: &GlobalOpts) -> Result<Self> {
        let git = GitCli::new();
        let repo_root = git.repo_root(&opts.path).await?;
        let config = ErkConfig::resolve(opts.erk_home.clone(), opts.pool_size, repo_root)?;
        let paths = config.pool_paths();
        Ok(Self { git, config, paths })
    }

    /// Saved pool state, or a fresh pool when none exists yet
    pub fn pool_state(&self) -> Result<PoolState> {
        Ok(load_pool_state(&self.paths.pool_file)?
            .unwrap_or_else(|| PoolState::new(self.config.pool_size)))
    }

    pub fn repo_root(&self) -> &Path {
        &self.config.repo_root
    }
}

/// GitHub service for the repository's `origin` remote
pub(crate) async fn open_platform(
    git: &dyn GitGateway,
    repo_root: &Path,
) -> Result<Box<dyn PlatformService>> {
    let url = git.remote_url(repo_root, DEFAULT_REMOTE).await?;
    let config = parse_repo_info(&url)?;
    let auth = erk::auth::get_github_auth().await?;
    create_platform_service(&config, Some(&auth))
}

/// Print a value as pretty JSON on stdout
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    anstream::println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
