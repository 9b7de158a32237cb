//! Authentication for GitHub
//!
//! Supports CLI-based auth (gh) and environment variables.

mod github;

pub use github::{get_github_auth, test_github_auth, GitHubAuthConfig};

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from the gh CLI
    Cli,
    /// Token from environment variable
    EnvVar,
}

/// Outcome of an authentication status check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    /// Credentials are valid
    Authenticated {
        /// Login of the authenticated user
        username: String,
    },
    /// The tool reports that no user is logged in
    NotAuthenticated,
    /// No token was found to authenticate with
    NoCredentials,
}

impl AuthStatus {
    /// Whether credentials are valid
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}
