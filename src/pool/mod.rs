//! Worktree pool
//!
//! A fixed number of named worktree slots, each either bound to a branch or
//! parked on a placeholder branch:
//! - `state` - the `pool.json` document and naming conventions
//! - `diagnostics` - drift detection against disk and git
//! - `lifecycle` - assigning and releasing slots

mod diagnostics;
mod lifecycle;
mod state;

pub use diagnostics::{
    collect_pool_snapshot, run_sync_diagnostics, PoolSnapshot, SyncIssue, SyncIssueCode,
};
pub use lifecycle::{
    acquire_slot, assign_slot, find_next_available_slot, release_branch, slot_status,
    unassign_slot, PoolPaths, SlotStatus,
};
pub use state::{
    is_placeholder_branch, load_pool_state, placeholder_branch_name, save_pool_state, slot_name,
    slot_number, update_slot_objective, worktree_path_for, PoolState, SlotAssignment, SlotInfo,
    DEFAULT_POOL_SIZE, POOL_STATE_VERSION, SLOT_PREFIX,
};
