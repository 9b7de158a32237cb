//! Pool state document (`pool.json`)
//!
//! The state is a value: operations return a new [`PoolState`] and callers
//! save it immediately.

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

/// Schema version written by this crate
pub const POOL_STATE_VERSION: &str = "1.0";

/// Prefix of every slot directory and slot name
pub const SLOT_PREFIX: &str = "erk-managed-wt-";

/// Pool size used when none is configured
pub const DEFAULT_POOL_SIZE: u32 = 4;

static SLOT_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^erk-managed-wt-(\d+)$").expect("valid regex"));

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^__erk-slot-(\d+)-placeholder__$").expect("valid regex"));

/// Binding of a slot to a branch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotAssignment {
    /// Slot name, e.g. `erk-managed-wt-01`
    pub slot_name: String,
    /// Branch checked out in the slot's worktree
    pub branch_name: String,
    /// ISO-8601 assignment timestamp
    pub assigned_at: String,
    /// `<worktrees_dir>/<slot_name>`
    pub worktree_path: PathBuf,
}

/// Static metadata about a slot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotInfo {
    /// Slot name
    pub name: String,
    /// Last objective issue this slot was used to advance
    #[serde(default)]
    pub last_objective_issue: Option<u64>,
}

impl SlotInfo {
    /// Slot metadata with no objective
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            last_objective_issue: None,
        }
    }
}

/// The persisted pool document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PoolState {
    /// Schema version
    pub version: String,
    /// Configured number of slots
    pub pool_size: u32,
    /// Known slots
    #[serde(default)]
    pub slots: Vec<SlotInfo>,
    /// Current assignments, unique by slot name
    #[serde(default)]
    pub assignments: Vec<SlotAssignment>,
}

impl PoolState {
    /// Empty pool of the given size
    pub fn new(pool_size: u32) -> Self {
        Self {
            version: POOL_STATE_VERSION.to_string(),
            pool_size,
            slots: Vec::new(),
            assignments: Vec::new(),
        }
    }

    /// Names of every slot in the pool, in order
    pub fn slot_names(&self) -> Vec<String> {
        (1..=self.pool_size).map(slot_name).collect()
    }

    /// Whether `name` is one of this pool's slots
    pub fn contains_slot(&self, name: &str) -> bool {
        slot_number(name).is_some_and(|n| n >= 1 && n <= self.pool_size)
    }

    /// Assignment for a slot
    pub fn find_assignment_by_slot(&self, slot: &str) -> Option<&SlotAssignment> {
        self.assignments.iter().find(|a| a.slot_name == slot)
    }

    /// Assignment holding a branch
    pub fn find_assignment_by_branch(&self, branch: &str) -> Option<&SlotAssignment> {
        self.assignments.iter().find(|a| a.branch_name == branch)
    }

    /// Slot metadata by name
    pub fn find_slot_info(&self, name: &str) -> Option<&SlotInfo> {
        self.slots.iter().find(|s| s.name == name)
    }

    /// New state with `assignment` replacing any existing one for its slot
    ///
    /// Also records a [`SlotInfo`] for the slot if it has none.
    #[must_use]
    pub fn with_assignment(&self, assignment: SlotAssignment) -> Self {
        let mut next = self.clone();
        if next.find_slot_info(&assignment.slot_name).is_none() {
            next.slots.push(SlotInfo::new(assignment.slot_name.clone()));
        }
        next.assignments.retain(|a| a.slot_name != assignment.slot_name);
        next.assignments.push(assignment);
        next
    }

    /// New state without any assignment for `slot`
    #[must_use]
    pub fn without_assignment(&self, slot: &str) -> Self {
        let mut next = self.clone();
        next.assignments.retain(|a| a.slot_name != slot);
        next
    }
}

/// Slot name for a 1-based slot number (`erk-managed-wt-01`)
pub fn slot_name(number: u32) -> String {
    format!("{SLOT_PREFIX}{number:02}")
}

/// Slot number from a slot name
pub fn slot_number(name: &str) -> Option<u32> {
    SLOT_NAME_RE
        .captures(name)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Placeholder branch checked out in an unassigned slot
pub fn placeholder_branch_name(slot: &str) -> Option<String> {
    slot_number(slot).map(|n| format!("__erk-slot-{n:02}-placeholder__"))
}

/// Whether a branch is a slot placeholder
pub fn is_placeholder_branch(branch: &str) -> bool {
    PLACEHOLDER_RE.is_match(branch)
}

/// Worktree directory of a slot
pub fn worktree_path_for(worktrees_dir: &Path, slot: &str) -> PathBuf {
    worktrees_dir.join(slot)
}

/// Load pool state
///
/// Returns `Ok(None)` when the file doesn't exist (pool never initialized).
pub fn load_pool_state(path: &Path) -> Result<Option<PoolState>> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("no pool state at {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let state: PoolState =
        serde_json::from_str(&contents).map_err(|e| Error::PoolStateCorrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    debug!(
        "loaded pool state: {} slots, {} assignments",
        state.pool_size,
        state.assignments.len()
    );
    Ok(Some(state))
}

/// Save pool state, creating parent directories
///
/// Writes to a sibling temp file and renames it over the target so readers
/// never observe a partial document. There is no lock: concurrent writers
/// race and the last rename wins.
pub fn save_pool_state(path: &Path, state: &PoolState) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut buf = serde_json::to_string_pretty(state)?;
    buf.push('\n');

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, buf)?;
    fs::rename(&tmp_path, path)?;

    debug!("saved pool state to {}", path.display());
    Ok(())
}

/// Replace a slot's last objective issue
///
/// Returns a clone of `state` unchanged when no slot matches.
pub fn update_slot_objective(
    state: &PoolState,
    slot: &str,
    objective_issue: Option<u64>,
) -> PoolState {
    let mut next = state.clone();
    if let Some(info) = next.slots.iter_mut().find(|s| s.name == slot) {
        info.last_objective_issue = objective_issue;
    }
    next
}
