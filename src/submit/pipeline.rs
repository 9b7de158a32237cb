//! Step sequencing for `erk submit`

use crate::git::GitGateway;
use crate::graphite::GraphiteService;
use crate::platform::PlatformService;
use crate::submit::progress::ProgressCallback;
use crate::submit::state::{StepResult, SubmitState};
use crate::submit::{graphite, steps};
use tracing::{info, instrument};

/// Injected capabilities for one pipeline run
#[derive(Clone, Copy)]
pub struct SubmitContext<'a> {
    /// Local git access
    pub git: &'a dyn GitGateway,
    /// Forge access
    pub platform: &'a dyn PlatformService,
    /// Graphite access; required when `use_graphite` is set
    pub graphite: Option<&'a dyn GraphiteService>,
    /// Progress sink
    pub progress: &'a dyn ProgressCallback,
}

/// Run the submit pipeline to completion or the first failure
///
/// Steps run strictly in order. The first error is reported through
/// [`ProgressCallback::on_error`] and returned; no later step runs.
#[instrument(skip_all, fields(graphite = state.use_graphite, session = %state.session_id))]
pub async fn run_submit_pipeline(ctx: &SubmitContext<'_>, state: SubmitState) -> StepResult {
    let result = if state.use_graphite {
        run_graphite(ctx, state).await
    } else {
        run_core(ctx, state).await
    };

    match &result {
        Ok(state) => info!(
            "submitted {} as PR #{}",
            state.branch_name,
            state.pr_number.unwrap_or_default()
        ),
        Err(err) => {
            info!("submit stopped: {err}");
            ctx.progress.on_error(err).await;
        }
    }
    result
}

async fn run_core(ctx: &SubmitContext<'_>, state: SubmitState) -> StepResult {
    let state = steps::check_auth(ctx, state).await?;
    let state = steps::resolve_branch(ctx, state).await?;
    let state = steps::resolve_parent(ctx, state).await?;
    let state = steps::count_commits(ctx, state).await?;
    let state = steps::check_divergence(ctx, state).await?;
    let state = steps::auto_rebase(ctx, state).await?;
    let state = steps::push_branch(ctx, state).await?;
    let state = steps::guard_parent_pr(ctx, state).await?;
    let state = steps::capture_diff(ctx, state).await?;
    let state = steps::create_or_update_pr(ctx, state).await?;
    steps::finalize(ctx, state).await
}

async fn run_graphite(ctx: &SubmitContext<'_>, state: SubmitState) -> StepResult {
    let state = steps::check_auth(ctx, state).await?;
    let state = steps::resolve_branch(ctx, state).await?;
    let state = steps::resolve_parent(ctx, state).await?;
    let state = steps::count_commits(ctx, state).await?;
    let state = steps::check_divergence(ctx, state).await?;
    let state = steps::auto_rebase(ctx, state).await?;
    let state = graphite::squash(ctx, state).await?;
    let state = graphite::restack(ctx, state).await?;
    let state = graphite::submit_stack(ctx, state).await?;
    let state = steps::capture_diff(ctx, state).await?;
    let state = steps::create_or_update_pr(ctx, state).await?;
    let state = graphite::attach_graphite_url(ctx, state).await?;
    steps::finalize(ctx, state).await
}
