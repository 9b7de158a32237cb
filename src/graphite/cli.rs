//! Subprocess-backed Graphite gateway

use crate::auth::AuthStatus;
use crate::error::{Error, Result};
use crate::graphite::GraphiteService;
use crate::process::{self, Tool};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// File in the git common dir where `gt` persists branch metadata
const BRANCH_CACHE_FILE: &str = ".graphite_cache_persist";

/// File in the home directory where `gt` stores its auth token
const USER_CONFIG_FILE: &str = ".graphite_user_config";

/// Graphite gateway that shells out to `gt`
#[derive(Debug, Clone, Default)]
pub struct GraphiteCli {
    home: Option<PathBuf>,
}

impl GraphiteCli {
    /// Create a gateway reading user config from the home directory
    pub fn new() -> Self {
        Self {
            home: dirs::home_dir(),
        }
    }

    async fn gt(cwd: &Path, args: &[&str]) -> Result<String> {
        process::run_checked(Tool::Graphite, args, cwd).await
    }
}

#[derive(Deserialize)]
struct UserConfig {
    #[serde(rename = "authToken")]
    auth_token: Option<String>,
}

#[derive(Deserialize)]
struct BranchCache {
    #[serde(default)]
    branches: Vec<(String, BranchMeta)>,
}

#[derive(Deserialize)]
struct BranchMeta {
    #[serde(rename = "parentBranchName")]
    parent_branch_name: Option<String>,
}

/// Parse Graphite's persisted branch cache into a branch → parent map
pub fn parse_branch_cache(contents: &str) -> Result<HashMap<String, Option<String>>> {
    let cache: BranchCache = serde_json::from_str(contents)?;
    Ok(cache
        .branches
        .into_iter()
        .map(|(name, meta)| (name, meta.parent_branch_name))
        .collect())
}

#[async_trait]
impl GraphiteService for GraphiteCli {
    async fn check_auth(&self) -> Result<AuthStatus> {
        let Some(ref home) = self.home else {
            return Ok(AuthStatus::NotAuthenticated);
        };
        let path = home.join(USER_CONFIG_FILE);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(AuthStatus::NotAuthenticated);
            }
            Err(e) => return Err(e.into()),
        };

        let config: UserConfig = serde_json::from_str(&contents)?;
        match config.auth_token {
            // gt doesn't expose the username locally
            Some(token) if !token.is_empty() => Ok(AuthStatus::Authenticated {
                username: String::new(),
            }),
            _ => Ok(AuthStatus::NotAuthenticated),
        }
    }

    async fn parent_branch(&self, git_common_dir: &Path, branch: &str) -> Result<Option<String>> {
        let path = git_common_dir.join(BRANCH_CACHE_FILE);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no graphite cache at {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let parents = parse_branch_cache(&contents)
            .map_err(|e| Error::Graphite(format!("unreadable branch cache: {e}")))?;
        Ok(parents.get(branch).cloned().flatten())
    }

    #[instrument(skip(self))]
    async fn squash_branch(&self, cwd: &Path) -> Result<()> {
        Self::gt(cwd, &["squash", "--no-edit", "--no-interactive"]).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn restack(&self, cwd: &Path) -> Result<()> {
        Self::gt(cwd, &["restack", "--no-interactive"]).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn submit_stack(&self, cwd: &Path, force: bool) -> Result<()> {
        let mut args = vec!["submit", "--no-edit", "--no-interactive"];
        if force {
            args.push("--force");
        }
        Self::gt(cwd, &args).await?;
        Ok(())
    }
}
