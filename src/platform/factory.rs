//! Platform service factory
//!
//! Creates the GitHub service for the repository's remote.

use crate::auth::GitHubAuthConfig;
use crate::error::Result;
use crate::platform::{GitHubService, PlatformService};
use crate::types::PlatformConfig;

/// Create a platform service from repository configuration and credentials
///
/// `GH_HOST` from the auth config wins over the host parsed from the remote.
/// With no credentials the service is anonymous and fails its auth check.
pub fn create_platform_service(
    config: &PlatformConfig,
    auth: Option<&GitHubAuthConfig>,
) -> Result<Box<dyn PlatformService>> {
    let host = auth
        .and_then(|a| a.host.clone())
        .or_else(|| config.host.clone());
    Ok(Box::new(GitHubService::new(
        auth.map(|a| a.token.as_str()),
        config.owner.clone(),
        config.repo.clone(),
        host,
    )?))
}
