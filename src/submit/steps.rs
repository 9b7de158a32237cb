//! Core pipeline steps
//!
//! Each step takes the state by value and either hands back an augmented
//! state or a terminal [`SubmitError`]. Steps check the current git/GitHub
//! state before acting so a re-run after a partial failure is safe.

use crate::auth::AuthStatus;
use crate::error::Error;
use crate::submit::body::{ensure_checkout_footer, ensure_issue_reference, split_commit_message};
use crate::submit::pipeline::SubmitContext;
use crate::submit::progress::{Phase, PushStatus};
use crate::submit::scratch::{cleanup_session, write_scratch_file};
use crate::submit::state::{StepResult, SubmitError, SubmitErrorKind};
use crate::submit::SubmitState;
use crate::types::{BranchDivergence, PrUpdate};
use tracing::{debug, warn};

/// Name of the diff scratch file
pub const DIFF_FILE_NAME: &str = "pr-diff.txt";

fn command_failed(context: &str, err: &Error) -> SubmitError {
    SubmitError::new(SubmitErrorKind::CommandFailed, format!("{context}: {err}"))
}

/// Verify GitHub, and Graphite when enabled, credentials
pub async fn check_auth(ctx: &SubmitContext<'_>, state: SubmitState) -> StepResult {
    ctx.progress.on_phase(Phase::Authenticating).await;

    match ctx.platform.check_auth().await {
        Ok(AuthStatus::Authenticated { username }) => {
            debug!("authenticated to GitHub as {username}");
        }
        Ok(AuthStatus::NotAuthenticated) => {
            return Err(SubmitError::new(
                SubmitErrorKind::GithubAuthFailed,
                "GitHub rejected the configured credentials",
            ));
        }
        Ok(AuthStatus::NoCredentials) => {
            return Err(SubmitError::new(
                SubmitErrorKind::GhNotAuthenticated,
                "no GitHub token found. Run `gh auth login` or set GITHUB_TOKEN",
            ));
        }
        Err(e) => {
            return Err(SubmitError::new(
                SubmitErrorKind::GithubAuthFailed,
                format!("could not verify GitHub authentication: {e}"),
            ));
        }
    }

    if state.use_graphite {
        let Some(graphite) = ctx.graphite else {
            return Err(SubmitError::new(
                SubmitErrorKind::GtNotAuthenticated,
                "Graphite mode requested but no Graphite gateway is configured",
            ));
        };
        match graphite.check_auth().await {
            Ok(AuthStatus::Authenticated { .. }) => {}
            Ok(AuthStatus::NotAuthenticated | AuthStatus::NoCredentials) => {
                return Err(SubmitError::new(
                    SubmitErrorKind::GtNotAuthenticated,
                    "Graphite is not authenticated. Run `gt auth`",
                ));
            }
            Err(e) => {
                return Err(SubmitError::new(
                    SubmitErrorKind::GtNotAuthenticated,
                    format!("could not read Graphite auth: {e}"),
                ));
            }
        }
    }

    Ok(state)
}

/// Read the branch checked out in `cwd`
pub async fn resolve_branch(ctx: &SubmitContext<'_>, mut state: SubmitState) -> StepResult {
    ctx.progress.on_phase(Phase::ResolvingBranch).await;

    match ctx.git.current_branch(&state.cwd).await {
        Ok(Some(branch)) => {
            state.branch_name = branch;
            Ok(state)
        }
        Ok(None) => Err(SubmitError::new(
            SubmitErrorKind::NoBranch,
            "HEAD is detached; check out a branch first",
        )
        .with_detail("cwd", state.cwd.display())),
        Err(e) => Err(command_failed("could not read current branch", &e)),
    }
}

/// Determine the branch the PR will target
///
/// Graphite mode reads the tracked parent; otherwise an explicit parent on
/// the state is kept and trunk is the default.
pub async fn resolve_parent(ctx: &SubmitContext<'_>, mut state: SubmitState) -> StepResult {
    if state.use_graphite {
        let Some(graphite) = ctx.graphite else {
            return Err(SubmitError::new(
                SubmitErrorKind::NoParent,
                "Graphite gateway unavailable",
            ));
        };
        let git_dir = ctx
            .git
            .git_common_dir(&state.repo_root)
            .await
            .map_err(|e| command_failed("could not locate the git directory", &e))?;
        match graphite.parent_branch(&git_dir, &state.branch_name).await {
            Ok(Some(parent)) => state.parent_branch = parent,
            Ok(None) => {
                return Err(SubmitError::new(
                    SubmitErrorKind::NoParent,
                    format!(
                        "{} is not tracked by Graphite. Run `gt track`",
                        state.branch_name
                    ),
                ));
            }
            Err(e) => return Err(command_failed("could not read Graphite metadata", &e)),
        }
    } else if state.parent_branch.is_empty() {
        state.parent_branch = state.trunk_branch.clone();
    }

    debug!("{} targets {}", state.branch_name, state.parent_branch);
    Ok(state)
}

/// Require at least one commit ahead of the parent
pub async fn count_commits(ctx: &SubmitContext<'_>, mut state: SubmitState) -> StepResult {
    ctx.progress.on_phase(Phase::Inspecting).await;

    let count = ctx
        .git
        .commits_ahead(&state.cwd, &state.parent_branch)
        .await
        .map_err(|e| command_failed("could not count commits", &e))?;

    if count == 0 {
        return Err(SubmitError::new(
            SubmitErrorKind::NoCommits,
            format!(
                "{} has no commits ahead of {}",
                state.branch_name, state.parent_branch
            ),
        ));
    }

    state.commit_count = count;
    Ok(state)
}

/// Stop on divergence from the remote unless forced
pub async fn check_divergence(ctx: &SubmitContext<'_>, mut state: SubmitState) -> StepResult {
    if let Err(e) = ctx.git.fetch(&state.cwd).await {
        warn!("fetch failed, comparing against cached remote refs: {e}");
    }

    let divergence = ctx
        .git
        .divergence(&state.cwd, &state.branch_name)
        .await
        .map_err(|e| command_failed("could not compare with remote", &e))?;

    if divergence.is_diverged {
        if !state.force {
            return Err(SubmitError::new(
                SubmitErrorKind::BranchDiverged,
                format!(
                    "{} has diverged from its remote ({} ahead, {} behind). \
                     Rebase, or re-run with --force to overwrite the remote",
                    state.branch_name, divergence.ahead, divergence.behind
                ),
            )
            .with_detail("ahead", divergence.ahead)
            .with_detail("behind", divergence.behind));
        }
        ctx.progress
            .on_message(&format!(
                "{} has diverged from remote; forcing push",
                state.branch_name
            ))
            .await;
    }

    state.divergence = divergence;
    Ok(state)
}

/// Rebase onto the remote tracking branch when only behind
pub async fn auto_rebase(ctx: &SubmitContext<'_>, mut state: SubmitState) -> StepResult {
    let d = state.divergence;
    if d.is_diverged || d.behind == 0 {
        return Ok(state);
    }

    ctx.progress.on_phase(Phase::Rebasing).await;
    ctx.progress
        .on_message(&format!(
            "{} is {} commit(s) behind remote; rebasing",
            state.branch_name, d.behind
        ))
        .await;

    match ctx.git.pull_rebase(&state.cwd, &state.branch_name).await {
        Ok(()) => {
            state.divergence = BranchDivergence::from_counts(d.ahead, 0);
            Ok(state)
        }
        Err(Error::Conflict(msg)) => Err(SubmitError::new(
            SubmitErrorKind::BranchDiverged,
            "rebase onto remote stopped on conflicts; resolve them and re-run",
        )
        .with_detail("reason", "rebase_conflict")
        .with_detail("output", msg)),
        Err(e) => Err(command_failed("rebase onto remote failed", &e)),
    }
}

/// Push the branch
pub async fn push_branch(ctx: &SubmitContext<'_>, state: SubmitState) -> StepResult {
    ctx.progress.on_phase(Phase::Pushing).await;
    ctx.progress
        .on_push(&state.branch_name, PushStatus::Started)
        .await;

    match ctx
        .git
        .push(&state.cwd, &state.branch_name, state.force)
        .await
    {
        Ok(()) => {
            let status = if state.force {
                PushStatus::Forced
            } else {
                PushStatus::Success
            };
            ctx.progress.on_push(&state.branch_name, status).await;
            Ok(state)
        }
        Err(e) => {
            ctx.progress
                .on_push(&state.branch_name, PushStatus::Failed(e.to_string()))
                .await;
            Err(match e {
                Error::PushRejected(msg) => SubmitError::new(
                    SubmitErrorKind::BranchDiverged,
                    format!(
                        "push of {} was rejected; pull or re-run with --force",
                        state.branch_name
                    ),
                )
                .with_detail("output", msg),
                other => SubmitError::new(
                    SubmitErrorKind::PushFailed,
                    format!("push of {} failed: {other}", state.branch_name),
                ),
            })
        }
    }
}

/// A stacked PR needs its parent to have an open PR
pub async fn guard_parent_pr(ctx: &SubmitContext<'_>, state: SubmitState) -> StepResult {
    if !state.is_stacked() {
        return Ok(state);
    }

    match ctx.platform.find_existing_pr(&state.parent_branch).await {
        Ok(Some(pr)) => {
            debug!("parent {} has PR #{}", state.parent_branch, pr.number);
            Ok(state)
        }
        Ok(None) => Err(SubmitError::new(
            SubmitErrorKind::ParentBranchNoPr,
            format!(
                "parent branch {} has no open PR; submit it first",
                state.parent_branch
            ),
        )
        .with_detail("parent_branch", &state.parent_branch)),
        Err(e) => Err(command_failed("could not look up parent PR", &e)),
    }
}

/// Save the branch diff to a session scratch file
pub async fn capture_diff(ctx: &SubmitContext<'_>, mut state: SubmitState) -> StepResult {
    let diff = ctx
        .git
        .diff_against(&state.cwd, &state.parent_branch)
        .await
        .map_err(|e| command_failed("could not diff against parent", &e))?;

    let path = write_scratch_file(&state.repo_root, &state.session_id, DIFF_FILE_NAME, &diff)
        .await
        .map_err(|e| {
            SubmitError::new(
                SubmitErrorKind::FinalizeFailed,
                format!("could not write diff scratch file: {e}"),
            )
        })?;

    if state.debug {
        ctx.progress
            .on_message(&format!("Diff saved to {}", path.display()))
            .await;
    }
    state.diff_file = Some(path);
    Ok(state)
}

/// Create the PR, or bring an existing one up to date
///
/// The checkout footer is appended exactly once. In Graphite mode `gt submit`
/// has already created the PR, so a missing PR is an error.
pub async fn create_or_update_pr(ctx: &SubmitContext<'_>, mut state: SubmitState) -> StepResult {
    ctx.progress.on_phase(Phase::SubmittingPr).await;

    let existing = ctx
        .platform
        .find_existing_pr(&state.branch_name)
        .await
        .map_err(|e| command_failed("could not look up PR", &e))?;

    let pr = match existing {
        None if state.use_graphite => {
            return Err(SubmitError::new(
                SubmitErrorKind::PrNotFound,
                format!("no open PR for {} after `gt submit`", state.branch_name),
            ));
        }
        None => {
            let (title, body) = pr_title_and_body(ctx, &state).await?;
            let body = ensure_issue_reference(&body, state.issue_number);

            let created = ctx
                .platform
                .create_pr(&state.branch_name, &state.parent_branch, &title, &body)
                .await
                .map_err(|e| {
                    SubmitError::new(
                        SubmitErrorKind::PrCreateFailed,
                        format!("could not create PR for {}: {e}", state.branch_name),
                    )
                })?;
            ctx.progress.on_pr_created(&state.branch_name, &created).await;
            state.was_created = true;

            // The footer needs the number GitHub assigned
            let update = PrUpdate {
                body: Some(ensure_checkout_footer(&created.body, created.number)),
                ..PrUpdate::default()
            };
            apply_update(ctx, created.number, &update).await?
        }
        Some(pr) => {
            let base_body = state.body.as_deref().unwrap_or(&pr.body);
            let body = ensure_checkout_footer(
                &ensure_issue_reference(base_body, state.issue_number),
                pr.number,
            );

            let update = PrUpdate {
                title: state.title.clone().filter(|t| *t != pr.title),
                body: Some(body).filter(|b| *b != pr.body),
                base: Some(state.parent_branch.clone())
                    .filter(|b| !state.use_graphite && *b != pr.base_ref),
            };

            if update == PrUpdate::default() {
                debug!("PR #{} already up to date", pr.number);
                pr
            } else {
                let updated = apply_update(ctx, pr.number, &update).await?;
                ctx.progress.on_pr_updated(&state.branch_name, &updated).await;
                updated
            }
        }
    };

    state.pr_number = Some(pr.number);
    state.pr_url = Some(pr.html_url);
    state.base_branch = Some(pr.base_ref);
    Ok(state)
}

async fn pr_title_and_body(
    ctx: &SubmitContext<'_>,
    state: &SubmitState,
) -> Result<(String, String), SubmitError> {
    if let (Some(title), Some(body)) = (&state.title, &state.body) {
        return Ok((title.clone(), body.clone()));
    }

    let message = ctx
        .git
        .head_commit_message(&state.cwd)
        .await
        .map_err(|e| command_failed("could not read commit message", &e))?;
    let (title, body) = split_commit_message(&message, &state.branch_name);

    Ok((
        state.title.clone().unwrap_or(title),
        state.body.clone().unwrap_or(body),
    ))
}

async fn apply_update(
    ctx: &SubmitContext<'_>,
    pr_number: u64,
    update: &PrUpdate,
) -> Result<crate::types::PullRequest, SubmitError> {
    match ctx.platform.update_pr(pr_number, update).await {
        Ok(pr) => Ok(pr),
        Err(e) => {
            // Distinguish a vanished PR from a failed edit
            if matches!(ctx.platform.get_pr(pr_number).await, Ok(None)) {
                Err(SubmitError::new(
                    SubmitErrorKind::PrNotFound,
                    format!("PR #{pr_number} no longer exists"),
                ))
            } else {
                Err(SubmitError::new(
                    SubmitErrorKind::PrUpdateFailed,
                    format!("could not update PR #{pr_number}: {e}"),
                )
                .with_detail("pr_number", pr_number))
            }
        }
    }
}

/// Remove scratch files unless debugging
pub async fn finalize(ctx: &SubmitContext<'_>, mut state: SubmitState) -> StepResult {
    ctx.progress.on_phase(Phase::Finalizing).await;

    if !state.debug {
        cleanup_session(&state.repo_root, &state.session_id)
            .await
            .map_err(|e| {
                SubmitError::new(
                    SubmitErrorKind::FinalizeFailed,
                    format!("could not remove scratch files: {e}"),
                )
            })?;
        state.diff_file = None;
    }

    ctx.progress.on_phase(Phase::Complete).await;
    Ok(state)
}
