//! Where erk keeps its per-repository data
//!
//! Layout under the erk home (default `~/.erk`):
//!
//! ```text
//! repos/<repo-name>/pool.json
//! repos/<repo-name>/worktrees/erk-managed-wt-01/
//! ```

use crate::error::{Error, Result};
use crate::pool::{PoolPaths, DEFAULT_POOL_SIZE};
use std::path::{Path, PathBuf};

/// Name of the erk home directory under `$HOME`
pub const ERK_DIR_NAME: &str = ".erk";

/// Resolved settings for one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErkConfig {
    /// Root of erk's data directory
    pub erk_home: PathBuf,
    /// Slots in a newly created pool
    pub pool_size: u32,
    /// Main worktree of the repository
    pub repo_root: PathBuf,
}

impl ErkConfig {
    /// Resolve configuration, defaulting the home to `~/.erk`
    pub fn resolve(
        erk_home: Option<PathBuf>,
        pool_size: Option<u32>,
        repo_root: impl Into<PathBuf>,
    ) -> Result<Self> {
        let erk_home = match erk_home {
            Some(home) => home,
            None => dirs::home_dir()
                .ok_or_else(|| Error::Internal("could not determine home directory".into()))?
                .join(ERK_DIR_NAME),
        };
        let pool_size = pool_size.unwrap_or(DEFAULT_POOL_SIZE);
        if pool_size == 0 {
            return Err(Error::Parse("pool size must be at least 1".into()));
        }
        Ok(Self {
            erk_home,
            pool_size,
            repo_root: repo_root.into(),
        })
    }

    /// Directory name identifying the repository
    pub fn repo_name(&self) -> String {
        repo_name(&self.repo_root)
    }

    /// Per-repository data directory
    pub fn repo_dir(&self) -> PathBuf {
        self.erk_home.join("repos").join(self.repo_name())
    }

    /// Pool file and worktree locations
    pub fn pool_paths(&self) -> PoolPaths {
        let repo_dir = self.repo_dir();
        PoolPaths {
            repo_root: self.repo_root.clone(),
            worktrees_dir: repo_dir.join("worktrees"),
            pool_file: repo_dir.join("pool.json"),
        }
    }
}

fn repo_name(repo_root: &Path) -> String {
    repo_root
        .file_name()
        .map_or_else(|| "repo".to_string(), |n| n.to_string_lossy().into_owned())
}
