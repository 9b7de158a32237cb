//! Land command - merge a branch's PR and free its slot

use crate::cli::style::{check, hyperlink_url, Stylize};
use crate::cli::{open_platform, print_json, GlobalOpts, RepoContext};
use anstream::println;
use dialoguer::Confirm;
use erk::error::{Error, Result};
use erk::git::GitGateway;
use erk::land::land_branch;
use serde_json::json;

/// Run `erk land`
///
/// Lands the current branch when `branch` is `None`. Asks for confirmation
/// unless `yes` is set or output is JSON.
pub async fn run_land(opts: &GlobalOpts, branch: Option<&str>, yes: bool) -> Result<()> {
    let repo = RepoContext::open(opts).await?;
    let branch = match branch {
        Some(b) => b.to_string(),
        None => repo
            .git
            .current_branch(&opts.path)
            .await?
            .ok_or_else(|| Error::Git("HEAD is detached; pass a branch to land".into()))?,
    };

    if !yes && !opts.json {
        let confirmed = Confirm::new()
            .with_prompt(format!("Squash-merge the PR for {branch}?"))
            .default(false)
            .interact()
            .map_err(|e| Error::Internal(format!("prompt failed: {e}")))?;
        if !confirmed {
            println!("{}", "Aborted".muted());
            return Ok(());
        }
    }

    let platform = open_platform(&repo.git, repo.repo_root()).await?;
    let state = repo.pool_state()?;
    let landed = land_branch(platform.as_ref(), &repo.git, &repo.paths, &state, &branch).await?;

    if opts.json {
        return print_json(&json!({
            "branch": branch,
            "pr_number": landed.pr.number,
            "pr_url": landed.pr.html_url,
            "released_slot": landed.released_slot,
        }));
    }

    println!(
        "{} Merged PR {} for {}",
        check(),
        format!("#{}", landed.pr.number).accent(),
        branch.emphasis()
    );
    println!("  {}", hyperlink_url(&landed.pr.html_url));
    if let Some(slot) = &landed.released_slot {
        println!("  Released {}", slot.accent());
    }
    Ok(())
}
