//! Pool commands - show slot occupancy and check for drift

use crate::cli::style::{check, issue_marker, slot_status_label, slot_status_marker, Stylize};
use crate::cli::{print_json, GlobalOpts, RepoContext};
use anstream::println;
use erk::error::Result;
use erk::pool::{collect_pool_snapshot, run_sync_diagnostics, slot_status, SlotStatus};
use serde::Serialize;
use std::process::ExitCode;

#[derive(Debug, Serialize)]
struct SlotRow {
    slot: String,
    #[serde(skip)]
    status: SlotStatus,
    #[serde(rename = "status")]
    label: &'static str,
    branch: Option<String>,
    assigned_at: Option<String>,
    last_objective_issue: Option<u64>,
}

/// Run `erk pool status`
pub async fn run_pool_status(opts: &GlobalOpts) -> Result<()> {
    let repo = RepoContext::open(opts).await?;
    let state = repo.pool_state()?;

    let rows: Vec<SlotRow> = state
        .slot_names()
        .into_iter()
        .map(|slot| {
            let status = slot_status(&state, &repo.paths.worktrees_dir, &slot);
            let assignment = state.find_assignment_by_slot(&slot);
            SlotRow {
                label: slot_status_label(&status),
                status,
                branch: assignment.map(|a| a.branch_name.clone()),
                assigned_at: assignment.map(|a| a.assigned_at.clone()),
                last_objective_issue: state
                    .find_slot_info(&slot)
                    .and_then(|info| info.last_objective_issue),
                slot,
            }
        })
        .collect();

    if opts.json {
        return print_json(&rows);
    }

    println!(
        "{} ({} slots)",
        "Worktree pool".emphasis(),
        state.pool_size.accent()
    );
    for row in &rows {
        let objective = row
            .last_objective_issue
            .map(|n| format!(" objective #{n}"))
            .unwrap_or_default();
        let (marker, label) = slot_status_marker(&row.status);
        match &row.status {
            SlotStatus::Assigned(branch) => println!(
                "  {marker} {} {}{}",
                row.slot.accent(),
                branch.emphasis(),
                objective.muted()
            ),
            SlotStatus::Available | SlotStatus::Empty => println!(
                "  {marker} {} {label}{}",
                row.slot.muted(),
                objective.muted()
            ),
        }
    }
    Ok(())
}

/// Run `erk pool check`
///
/// Exits non-zero when any drift is found.
pub async fn run_pool_check(opts: &GlobalOpts) -> Result<ExitCode> {
    let repo = RepoContext::open(opts).await?;
    let state = repo.pool_state()?;
    let snapshot =
        collect_pool_snapshot(&repo.git, repo.repo_root(), &repo.paths.worktrees_dir).await?;
    let issues = run_sync_diagnostics(&state, &snapshot);

    if opts.json {
        print_json(&issues)?;
    } else if issues.is_empty() {
        println!("{} Pool is consistent", check());
    } else {
        for issue in &issues {
            let (marker, code) = issue_marker(issue.code);
            println!(
                "  {marker} {code} {}: {}",
                issue.slot_name.accent(),
                issue.message
            );
        }
    }

    Ok(if issues.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
