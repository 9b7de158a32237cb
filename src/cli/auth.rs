//! Auth command - test and explain GitHub and Graphite authentication

use crate::cli::style::{check, cross, Stylize};
use anstream::println;
use erk::auth::{get_github_auth, test_github_auth, AuthStatus};
use erk::error::{Error, Result};
use erk::graphite::{GraphiteCli, GraphiteService};

/// Run the auth test command
pub async fn run_auth_test() -> Result<()> {
    println!("Testing GitHub authentication...");
    let config = get_github_auth().await?;
    match test_github_auth(&config).await? {
        AuthStatus::Authenticated { username } => {
            println!("  {} Authenticated as {}", check(), username.accent());
            println!("  {}", format!("Token source: {:?}", config.source).muted());
            if let Some(host) = &config.host {
                println!("  {}", format!("Host: {host}").muted());
            }
        }
        AuthStatus::NotAuthenticated | AuthStatus::NoCredentials => {
            return Err(Error::Auth("GitHub rejected the token".into()));
        }
    }

    println!("Checking Graphite authentication...");
    match GraphiteCli::new().check_auth().await {
        Ok(AuthStatus::Authenticated { .. }) => {
            println!("  {} Graphite token found", check());
        }
        Ok(AuthStatus::NotAuthenticated | AuthStatus::NoCredentials) | Err(_) => {
            println!(
                "  {} No Graphite token {}",
                cross(),
                "(only needed for --graphite)".muted()
            );
        }
    }
    Ok(())
}

/// Run the auth setup command (show instructions)
pub fn run_auth_setup() {
    println!("{}", "GitHub Authentication Setup".emphasis());
    println!("===========================");
    println!();
    println!("Option 1: GitHub CLI (recommended)");
    println!("  Install: https://cli.github.com/");
    println!("  Run: {}", "gh auth login".accent());
    println!();
    println!("Option 2: Environment variable");
    println!("  Set GITHUB_TOKEN or GH_TOKEN");
    println!();
    println!("For GitHub Enterprise:");
    println!("  Set GH_HOST to your instance hostname");
    println!();
    println!("{}", "Graphite (for `erk submit --graphite`)".emphasis());
    println!("  Run: {}", "gt auth --token <token>".accent());
}

/// Wrapper for auth commands
pub async fn run_auth(action: &str) -> Result<()> {
    match action {
        "test" => run_auth_test().await,
        "setup" => {
            run_auth_setup();
            Ok(())
        }
        _ => {
            println!("Unknown action: {action}. Use 'test' or 'setup'.");
            Ok(())
        }
    }
}
