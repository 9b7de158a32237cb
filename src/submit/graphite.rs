//! Graphite-only pipeline steps

use crate::error::Error;
use crate::graphite::{review_url, GraphiteService};
use crate::submit::pipeline::SubmitContext;
use crate::submit::progress::Phase;
use crate::submit::state::{StepResult, SubmitError, SubmitErrorKind};
use crate::submit::SubmitState;

fn gateway<'a>(ctx: &SubmitContext<'a>) -> Result<&'a dyn GraphiteService, SubmitError> {
    ctx.graphite.ok_or_else(|| {
        SubmitError::new(
            SubmitErrorKind::GtNotAuthenticated,
            "Graphite gateway unavailable",
        )
    })
}

/// Squash the branch to one commit when it has several
pub async fn squash(ctx: &SubmitContext<'_>, mut state: SubmitState) -> StepResult {
    if state.commit_count < 2 {
        return Ok(state);
    }
    let graphite = gateway(ctx)?;
    ctx.progress.on_phase(Phase::Squashing).await;

    match graphite.squash_branch(&state.cwd).await {
        Ok(()) => {
            state.commit_count = 1;
            Ok(state)
        }
        Err(Error::Conflict(msg)) => Err(SubmitError::new(
            SubmitErrorKind::SquashConflict,
            format!("squashing {} hit conflicts", state.branch_name),
        )
        .with_detail("output", msg)),
        Err(e) => Err(SubmitError::new(
            SubmitErrorKind::SquashFailed,
            format!("could not squash {}: {e}", state.branch_name),
        )),
    }
}

/// Restack the branch onto its parent
pub async fn restack(ctx: &SubmitContext<'_>, state: SubmitState) -> StepResult {
    let graphite = gateway(ctx)?;
    ctx.progress.on_phase(Phase::Restacking).await;

    match graphite.restack(&state.cwd).await {
        Ok(()) => Ok(state),
        Err(Error::Conflict(msg)) => Err(SubmitError::new(
            SubmitErrorKind::RestackConflict,
            "restack hit conflicts; resolve them, run `gt continue`, then re-run",
        )
        .with_detail("output", msg)),
        Err(e) => Err(SubmitError::new(
            SubmitErrorKind::CommandFailed,
            format!("gt restack failed: {e}"),
        )),
    }
}

/// Push and open PRs with `gt submit`
pub async fn submit_stack(ctx: &SubmitContext<'_>, state: SubmitState) -> StepResult {
    let graphite = gateway(ctx)?;
    ctx.progress.on_phase(Phase::Pushing).await;

    match graphite.submit_stack(&state.cwd, state.force).await {
        Ok(()) => Ok(state),
        Err(Error::PushRejected(msg)) => Err(SubmitError::new(
            SubmitErrorKind::BranchDiverged,
            format!(
                "gt submit was rejected for {}; re-run with --force",
                state.branch_name
            ),
        )
        .with_detail("output", msg)),
        Err(e) => Err(SubmitError::new(
            SubmitErrorKind::FinalizeFailed,
            format!("gt submit failed: {e}"),
        )),
    }
}

/// Record the Graphite review URL for the PR
pub async fn attach_graphite_url(ctx: &SubmitContext<'_>, mut state: SubmitState) -> StepResult {
    if let Some(number) = state.pr_number {
        state.graphite_url = Some(review_url(ctx.platform.config(), number));
    }
    Ok(state)
}
