//! GitHub authentication

use crate::auth::{AuthSource, AuthStatus};
use crate::error::{Error, Result};
use std::env;
use tokio::process::Command;
use tracing::debug;

/// GitHub authentication configuration
#[derive(Debug, Clone)]
pub struct GitHubAuthConfig {
    /// Authentication token
    pub token: String,
    /// Where the token was obtained from
    pub source: AuthSource,
    /// GitHub Enterprise host, from `GH_HOST`
    pub host: Option<String>,
}

/// Get GitHub authentication
///
/// Priority:
/// 1. gh CLI (`gh auth token`)
/// 2. `GITHUB_TOKEN` environment variable
/// 3. `GH_TOKEN` environment variable
pub async fn get_github_auth() -> Result<GitHubAuthConfig> {
    let host = env::var("GH_HOST").ok().filter(|h| !h.is_empty());

    if let Some(token) = get_gh_cli_token(host.as_deref()).await {
        debug!("using GitHub token from gh CLI");
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::Cli,
            host,
        });
    }

    for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
        if let Ok(token) = env::var(var) {
            if !token.is_empty() {
                debug!("using GitHub token from {var}");
                return Ok(GitHubAuthConfig {
                    token,
                    source: AuthSource::EnvVar,
                    host,
                });
            }
        }
    }

    Err(Error::Auth(
        "No GitHub authentication found. Run `gh auth login` or set GITHUB_TOKEN".to_string(),
    ))
}

async fn get_gh_cli_token(host: Option<&str>) -> Option<String> {
    let mut status_args = vec!["auth", "status"];
    let mut token_args = vec!["auth", "token"];
    if let Some(h) = host {
        status_args.extend(["--hostname", h]);
        token_args.extend(["--hostname", h]);
    }

    // Fails when gh isn't installed, too
    let status = Command::new("gh").args(&status_args).output().await.ok()?;
    if !status.status.success() {
        return None;
    }

    let output = Command::new("gh").args(&token_args).output().await.ok()?;
    if !output.status.success() {
        return None;
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() { None } else { Some(token) }
}

/// Test GitHub authentication by fetching the current user
pub async fn test_github_auth(config: &GitHubAuthConfig) -> Result<AuthStatus> {
    let mut builder = octocrab::Octocrab::builder().personal_token(config.token.clone());
    if let Some(ref h) = config.host {
        builder = builder
            .base_uri(format!("https://{h}/api/v3"))
            .map_err(|e| Error::GitHubApi(e.to_string()))?;
    }
    let octocrab = builder.build().map_err(|e| Error::GitHubApi(e.to_string()))?;

    match octocrab.current().user().await {
        Ok(user) => Ok(AuthStatus::Authenticated {
            username: user.login,
        }),
        Err(octocrab::Error::GitHub { source, .. }) if source.status_code.as_u16() == 401 => {
            Ok(AuthStatus::NotAuthenticated)
        }
        Err(e) => Err(Error::Auth(format!("Invalid token: {e}"))),
    }
}
