//! Binding branches to slots and releasing them

use crate::error::{Error, Result};
use crate::git::GitGateway;
use crate::pool::state::{
    is_placeholder_branch, placeholder_branch_name, save_pool_state, worktree_path_for, PoolState,
    SlotAssignment,
};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where a pool lives on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolPaths {
    /// Main worktree of the repository
    pub repo_root: PathBuf,
    /// Directory holding the slot worktrees
    pub worktrees_dir: PathBuf,
    /// Location of `pool.json`
    pub pool_file: PathBuf,
}

/// Occupancy of a slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotStatus {
    /// Bound to a branch
    Assigned(String),
    /// Unassigned, worktree directory present
    Available,
    /// Unassigned, no worktree directory yet
    Empty,
}

/// Occupancy of `slot` given the state and what's on disk
pub fn slot_status(state: &PoolState, worktrees_dir: &Path, slot: &str) -> SlotStatus {
    if let Some(a) = state.find_assignment_by_slot(slot) {
        SlotStatus::Assigned(a.branch_name.clone())
    } else if worktree_path_for(worktrees_dir, slot).is_dir() {
        SlotStatus::Available
    } else {
        SlotStatus::Empty
    }
}

/// First free slot, preferring initialized worktrees over empty ones
pub fn find_next_available_slot(state: &PoolState, worktrees_dir: &Path) -> Option<String> {
    let names = state.slot_names();
    let free = |wanted: &SlotStatus| {
        names
            .iter()
            .find(|slot| &slot_status(state, worktrees_dir, slot) == wanted)
            .cloned()
    };
    free(&SlotStatus::Available).or_else(|| free(&SlotStatus::Empty))
}

/// Check out `branch` in a free slot and record the assignment
///
/// Creates the slot's worktree when the directory doesn't exist yet.
pub async fn assign_slot(
    git: &dyn GitGateway,
    paths: &PoolPaths,
    state: &PoolState,
    slot: &str,
    branch: &str,
) -> Result<PoolState> {
    if !state.contains_slot(slot) {
        return Err(Error::SlotNotFound(slot.to_string()));
    }
    if is_placeholder_branch(branch) {
        return Err(Error::Parse(format!("{branch} is a slot placeholder branch")));
    }
    if let Some(existing) = state.find_assignment_by_slot(slot) {
        return Err(Error::SlotOccupied {
            slot: slot.to_string(),
            branch: existing.branch_name.clone(),
        });
    }
    if let Some(existing) = state.find_assignment_by_branch(branch) {
        return Err(Error::SlotOccupied {
            slot: existing.slot_name.clone(),
            branch: branch.to_string(),
        });
    }

    let worktree_path = worktree_path_for(&paths.worktrees_dir, slot);
    if worktree_path.is_dir() {
        debug!("checking out {branch} in existing worktree {slot}");
        git.checkout(&worktree_path, branch).await?;
    } else {
        debug!("creating worktree {slot} for {branch}");
        std::fs::create_dir_all(&paths.worktrees_dir)?;
        git.add_worktree(&paths.repo_root, &worktree_path, branch).await?;
    }

    let next = state.with_assignment(SlotAssignment {
        slot_name: slot.to_string(),
        branch_name: branch.to_string(),
        assigned_at: Utc::now().to_rfc3339(),
        worktree_path,
    });
    save_pool_state(&paths.pool_file, &next)?;

    info!("assigned {branch} to {slot}");
    Ok(next)
}

/// Release a slot back to its placeholder branch
///
/// Safe to call on a slot that is already free: the placeholder is checked
/// out again and the assignments are left as they were. Slots outside the
/// pool are rejected unless they still hold an assignment.
pub async fn unassign_slot(
    git: &dyn GitGateway,
    paths: &PoolPaths,
    state: &PoolState,
    slot: &str,
) -> Result<PoolState> {
    if !state.contains_slot(slot) && state.find_assignment_by_slot(slot).is_none() {
        return Err(Error::SlotNotFound(slot.to_string()));
    }
    let placeholder =
        placeholder_branch_name(slot).ok_or_else(|| Error::SlotNotFound(slot.to_string()))?;

    if git.branch_head(&paths.repo_root, &placeholder).await?.is_none() {
        let trunk = git.trunk_branch(&paths.repo_root).await?;
        debug!("creating placeholder {placeholder} from {trunk}");
        git.create_branch(&paths.repo_root, &placeholder, &trunk).await?;
    }

    let worktree_path = worktree_path_for(&paths.worktrees_dir, slot);
    if worktree_path.is_dir() {
        git.checkout(&worktree_path, &placeholder).await?;
    } else {
        warn!(
            "worktree {} is missing; only updating pool state",
            worktree_path.display()
        );
    }

    let next = state.without_assignment(slot);
    save_pool_state(&paths.pool_file, &next)?;

    info!("released {slot}");
    Ok(next)
}

/// Slot holding `branch`, assigning the next free one if it has none
///
/// Returns the slot name and the resulting state.
pub async fn acquire_slot(
    git: &dyn GitGateway,
    paths: &PoolPaths,
    state: &PoolState,
    branch: &str,
) -> Result<(String, PoolState)> {
    if let Some(existing) = state.find_assignment_by_branch(branch) {
        return Ok((existing.slot_name.clone(), state.clone()));
    }

    let slot = find_next_available_slot(state, &paths.worktrees_dir)
        .ok_or(Error::NoAvailableSlot(state.pool_size))?;
    let next = assign_slot(git, paths, state, &slot, branch).await?;
    Ok((slot, next))
}

/// Release whichever slot holds `branch`
///
/// Returns the released slot, or `None` when the branch wasn't assigned.
pub async fn release_branch(
    git: &dyn GitGateway,
    paths: &PoolPaths,
    state: &PoolState,
    branch: &str,
) -> Result<(Option<String>, PoolState)> {
    let Some(slot) = state
        .find_assignment_by_branch(branch)
        .map(|a| a.slot_name.clone())
    else {
        return Ok((None, state.clone()));
    };
    let next = unassign_slot(git, paths, state, &slot).await?;
    Ok((Some(slot), next))
}
