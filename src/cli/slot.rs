//! Slot commands - bind branches to slots and release them

use crate::cli::style::{check, Stylize};
use crate::cli::{print_json, GlobalOpts, RepoContext};
use anstream::println;
use erk::error::{Error, Result};
use erk::pool::{
    acquire_slot, assign_slot, save_pool_state, unassign_slot, update_slot_objective,
    worktree_path_for, SlotInfo,
};
use serde_json::json;

/// Run `erk slot assign`
///
/// Uses `slot` when given, otherwise the next free slot.
pub async fn run_slot_assign(opts: &GlobalOpts, branch: &str, slot: Option<&str>) -> Result<()> {
    let repo = RepoContext::open(opts).await?;
    let state = repo.pool_state()?;

    let slot = match slot {
        Some(slot) => {
            assign_slot(&repo.git, &repo.paths, &state, slot, branch).await?;
            slot.to_string()
        }
        None => acquire_slot(&repo.git, &repo.paths, &state, branch).await?.0,
    };
    let path = worktree_path_for(&repo.paths.worktrees_dir, &slot);

    if opts.json {
        return print_json(&json!({ "slot": slot, "branch": branch, "worktree_path": path }));
    }
    println!(
        "{} {} is in {}",
        check(),
        branch.emphasis(),
        slot.accent()
    );
    println!("  {}", path.display().muted());
    Ok(())
}

/// Run `erk slot unassign`
pub async fn run_slot_unassign(opts: &GlobalOpts, slot: &str) -> Result<()> {
    let repo = RepoContext::open(opts).await?;
    let state = repo.pool_state()?;
    let previous = state
        .find_assignment_by_slot(slot)
        .map(|a| a.branch_name.clone());

    unassign_slot(&repo.git, &repo.paths, &state, slot).await?;

    if opts.json {
        return print_json(&json!({ "slot": slot, "released_branch": previous }));
    }
    match previous {
        Some(branch) => println!(
            "{} Released {} from {}",
            check(),
            branch.emphasis(),
            slot.accent()
        ),
        None => println!("{} {} was already free", check(), slot.accent()),
    }
    Ok(())
}

/// Run `erk slot objective`; `None` clears the objective
pub async fn run_slot_objective(opts: &GlobalOpts, slot: &str, issue: Option<u64>) -> Result<()> {
    let repo = RepoContext::open(opts).await?;
    let mut state = repo.pool_state()?;
    if !state.contains_slot(slot) {
        return Err(Error::SlotNotFound(slot.to_string()));
    }
    if state.find_slot_info(slot).is_none() {
        state.slots.push(SlotInfo::new(slot));
    }

    let next = update_slot_objective(&state, slot, issue);
    save_pool_state(&repo.paths.pool_file, &next)?;

    if opts.json {
        return print_json(&json!({ "slot": slot, "last_objective_issue": issue }));
    }
    match issue {
        Some(n) => println!("{} {} objective set to #{n}", check(), slot.accent()),
        None => println!("{} {} objective cleared", check(), slot.accent()),
    }
    Ok(())
}
