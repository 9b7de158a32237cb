//! Submit command - push the current branch and open or update its PR

use crate::cli::progress::CliProgress;
use crate::cli::style::{check, hyperlink_url, Stylize};
use crate::cli::{print_json, GlobalOpts};
use anstream::println;
use erk::auth::get_github_auth;
use erk::error::Result;
use erk::git::{GitCli, GitGateway, DEFAULT_REMOTE};
use erk::graphite::{GraphiteCli, GraphiteService};
use erk::platform::{create_platform_service, parse_repo_info};
use erk::submit::{
    run_submit_pipeline, NoopProgress, ProgressCallback, SubmitContext, SubmitError, SubmitState,
};
use std::process::ExitCode;
use tracing::debug;

/// Flags for `erk submit`
#[derive(Debug, Clone, Default)]
pub struct SubmitArgs {
    /// Submit through Graphite
    pub graphite: bool,
    /// Force-push over a diverged remote
    pub force: bool,
    /// Keep scratch files
    pub debug: bool,
    /// Target branch for the PR (core mode)
    pub base: Option<String>,
    /// Trunk override
    pub trunk: Option<String>,
    /// Issue the PR closes
    pub issue: Option<u64>,
    /// PR title
    pub title: Option<String>,
    /// PR body
    pub body: Option<String>,
}

/// Run the submit command
///
/// Pipeline failures are rendered and turned into a failing exit code;
/// only setup errors (no repository, bad remote) propagate as `Err`.
pub async fn run_submit(opts: &GlobalOpts, args: SubmitArgs) -> Result<ExitCode> {
    let git = GitCli::new();
    let repo_root = git.repo_root(&opts.path).await?;
    let trunk = match args.trunk {
        Some(trunk) => trunk,
        None => git.trunk_branch(&repo_root).await?,
    };

    let progress: Box<dyn ProgressCallback> = if opts.json {
        Box::new(NoopProgress)
    } else {
        Box::new(CliProgress::verbose())
    };

    let auth = get_github_auth()
        .await
        .inspect_err(|e| debug!("no GitHub credentials: {e}"))
        .ok();
    let url = git.remote_url(&repo_root, DEFAULT_REMOTE).await?;
    let platform = create_platform_service(&parse_repo_info(&url)?, auth.as_ref())?;
    let graphite = GraphiteCli::new();

    let session_id = uuid::Uuid::new_v4().to_string();
    debug!("submit session {session_id}");

    let mut state = SubmitState::new(&opts.path, &repo_root, trunk, session_id);
    state.use_graphite = args.graphite;
    state.force = args.force;
    state.debug = args.debug;
    state.issue_number = args.issue;
    state.title = args.title;
    state.body = args.body;
    if let Some(base) = args.base {
        state.parent_branch = base;
    }

    let ctx = SubmitContext {
        git: &git,
        platform: platform.as_ref(),
        graphite: args
            .graphite
            .then_some(&graphite as &dyn GraphiteService),
        progress: progress.as_ref(),
    };

    match run_submit_pipeline(&ctx, state).await {
        Ok(done) => {
            if opts.json {
                print_json(&done)?;
            } else {
                print_summary(&done);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_failure(opts, &err),
    }
}

fn report_failure(opts: &GlobalOpts, err: &SubmitError) -> Result<ExitCode> {
    if opts.json {
        print_json(err)?;
    }
    Ok(ExitCode::FAILURE)
}

fn print_summary(state: &SubmitState) {
    let Some(number) = state.pr_number else {
        return;
    };
    let verb = if state.was_created { "Created" } else { "Updated" };
    println!();
    println!(
        "{} {verb} PR {} ({} {} {})",
        check(),
        format!("#{number}").accent(),
        state.branch_name.emphasis(),
        "->".muted(),
        state.base_branch.as_deref().unwrap_or_default().accent()
    );
    if let Some(url) = &state.pr_url {
        println!("  {}", hyperlink_url(url));
    }
    if let Some(url) = &state.graphite_url {
        println!("  {} {}", "Graphite:".muted(), hyperlink_url(url));
    }
    if let Some(diff) = &state.diff_file {
        println!("  {} {}", "Diff:".muted(), diff.display());
    }
}
