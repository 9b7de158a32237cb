//! Pool consistency checks
//!
//! Compares `pool.json` against the slot directories on disk and git's
//! worktree registry. Nothing here mutates state or the filesystem.

use crate::error::Result;
use crate::git::GitGateway;
use crate::pool::state::{placeholder_branch_name, PoolState, SLOT_PREFIX};
use crate::types::WorktreeInfo;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Kind of drift found by [`run_sync_diagnostics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncIssueCode {
    /// Assignment exists but its worktree directory is missing
    OrphanState,
    /// Slot-named directory on disk that pool state doesn't know
    OrphanDir,
    /// Assigned branch no longer exists
    MissingBranch,
    /// Git has a different branch checked out than the pool records
    BranchMismatch,
    /// Assignment has no entry in git's worktree registry
    GitRegistryMissing,
    /// Slot-named registry entry absent from pool state
    UntrackedWorktree,
}

impl SyncIssueCode {
    /// Wire name of the code
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OrphanState => "orphan-state",
            Self::OrphanDir => "orphan-dir",
            Self::MissingBranch => "missing-branch",
            Self::BranchMismatch => "branch-mismatch",
            Self::GitRegistryMissing => "git-registry-missing",
            Self::UntrackedWorktree => "untracked-worktree",
        }
    }
}

impl fmt::Display for SyncIssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single inconsistency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncIssue {
    /// Issue kind
    pub code: SyncIssueCode,
    /// Slot the issue is about
    pub slot_name: String,
    /// Human-readable description
    pub message: String,
}

/// Observed world the pool state is checked against
#[derive(Debug, Clone, Default)]
pub struct PoolSnapshot {
    /// Git's worktree registry
    pub worktrees: Vec<WorktreeInfo>,
    /// Names of slot-named directories under the worktrees dir
    pub slot_dirs: HashSet<String>,
    /// Local branch names
    pub branches: HashSet<String>,
}

fn registry_slot_name(wt: &WorktreeInfo) -> Option<&str> {
    if wt.is_root {
        return None;
    }
    wt.path
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| n.starts_with(SLOT_PREFIX))
}

fn is_known_slot(state: &PoolState, name: &str) -> bool {
    state.contains_slot(name)
        || state.find_assignment_by_slot(name).is_some()
        || state.find_slot_info(name).is_some()
}

/// Whether an unassigned registry entry sits on its slot's placeholder
fn is_parked(wt: &WorktreeInfo, slot: &str) -> bool {
    wt.branch.is_some() && wt.branch == placeholder_branch_name(slot)
}

/// Check pool state against a snapshot and return every issue found
///
/// A missing worktree directory is reported as `orphan-state` alone; the
/// branch and registry checks only run for assignments whose directory exists.
/// Slots within `pool_size` are known even when `pool.json` has no `slots`
/// entry for them; unassigned ones must sit on their placeholder branch.
pub fn run_sync_diagnostics(state: &PoolState, snapshot: &PoolSnapshot) -> Vec<SyncIssue> {
    let mut issues = Vec::new();

    for assignment in &state.assignments {
        let slot = &assignment.slot_name;
        let branch = &assignment.branch_name;

        if !snapshot.slot_dirs.contains(slot) {
            issues.push(SyncIssue {
                code: SyncIssueCode::OrphanState,
                slot_name: slot.clone(),
                message: format!(
                    "{slot} is assigned to {branch} but {} does not exist",
                    assignment.worktree_path.display()
                ),
            });
            continue;
        }

        if !snapshot.branches.contains(branch) {
            issues.push(SyncIssue {
                code: SyncIssueCode::MissingBranch,
                slot_name: slot.clone(),
                message: format!("{slot} is assigned to {branch}, which no longer exists"),
            });
        }

        let entry = snapshot
            .worktrees
            .iter()
            .find(|wt| registry_slot_name(wt) == Some(slot.as_str()));

        match entry {
            None => issues.push(SyncIssue {
                code: SyncIssueCode::GitRegistryMissing,
                slot_name: slot.clone(),
                message: format!("{slot} is not registered in `git worktree list`"),
            }),
            Some(wt) if wt.branch.as_deref() != Some(branch.as_str()) => {
                issues.push(SyncIssue {
                    code: SyncIssueCode::BranchMismatch,
                    slot_name: slot.clone(),
                    message: format!(
                        "{slot} is recorded as {branch} but git has {} checked out",
                        wt.branch.as_deref().unwrap_or("a detached HEAD")
                    ),
                });
            }
            Some(_) => {}
        }
    }

    let mut dirs: Vec<&String> = snapshot.slot_dirs.iter().collect();
    dirs.sort();
    for dir in dirs {
        if !is_known_slot(state, dir) {
            issues.push(SyncIssue {
                code: SyncIssueCode::OrphanDir,
                slot_name: dir.clone(),
                message: format!("directory {dir} exists but is not in pool state"),
            });
        }
    }

    for wt in &snapshot.worktrees {
        let Some(name) = registry_slot_name(wt) else {
            continue;
        };
        if !is_known_slot(state, name) {
            issues.push(SyncIssue {
                code: SyncIssueCode::UntrackedWorktree,
                slot_name: name.to_string(),
                message: format!(
                    "git worktree {} is not tracked in pool state",
                    wt.path.display()
                ),
            });
        } else if state.find_assignment_by_slot(name).is_none() && !is_parked(wt, name) {
            issues.push(SyncIssue {
                code: SyncIssueCode::UntrackedWorktree,
                slot_name: name.to_string(),
                message: format!(
                    "{name} is unassigned but git has {} checked out",
                    wt.branch.as_deref().unwrap_or("a detached HEAD")
                ),
            });
        }
    }

    debug!("pool diagnostics found {} issues", issues.len());
    issues
}

/// Gather registry, slot directories and branches for diagnostics
pub async fn collect_pool_snapshot(
    git: &dyn GitGateway,
    repo_root: &Path,
    worktrees_dir: &Path,
) -> Result<PoolSnapshot> {
    let worktrees = git.list_worktrees(repo_root).await?;
    let branches = git.local_branches(repo_root).await?.into_iter().collect();

    let mut slot_dirs = HashSet::new();
    match std::fs::read_dir(worktrees_dir) {
        Ok(entries) => {
            for entry in entries {
                let entry = entry?;
                if !entry.file_type()?.is_dir() {
                    continue;
                }
                if let Some(name) = entry.file_name().to_str() {
                    if name.starts_with(SLOT_PREFIX) {
                        slot_dirs.insert(name.to_string());
                    }
                }
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    Ok(PoolSnapshot {
        worktrees,
        slot_dirs,
        branches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::state::{slot_name, SlotAssignment, SlotInfo};
    use std::path::PathBuf;

    const WT_DIR: &str = "/home/me/.erk/repos/demo/worktrees";

    fn assigned(slot: u32, branch: &str) -> SlotAssignment {
        SlotAssignment {
            slot_name: slot_name(slot),
            branch_name: branch.to_string(),
            assigned_at: "2026-01-01T00:00:00+00:00".to_string(),
            worktree_path: PathBuf::from(WT_DIR).join(slot_name(slot)),
        }
    }

    fn registry(entries: &[(&str, Option<&str>)]) -> Vec<WorktreeInfo> {
        let mut out = vec![WorktreeInfo {
            path: PathBuf::from("/repo"),
            branch: Some("main".to_string()),
            is_root: true,
        }];
        out.extend(entries.iter().map(|(slot, branch)| WorktreeInfo {
            path: PathBuf::from(WT_DIR).join(slot),
            branch: branch.map(ToString::to_string),
            is_root: false,
        }));
        out
    }

    fn codes(issues: &[SyncIssue]) -> Vec<SyncIssueCode> {
        issues.iter().map(|i| i.code).collect()
    }

    #[test]
    fn test_consistent_pool_has_no_issues() {
        let state = PoolState::new(2).with_assignment(assigned(1, "feat"));
        let snapshot = PoolSnapshot {
            worktrees: registry(&[("erk-managed-wt-01", Some("feat"))]),
            slot_dirs: ["erk-managed-wt-01".to_string()].into(),
            branches: ["main".to_string(), "feat".to_string()].into(),
        };
        assert!(run_sync_diagnostics(&state, &snapshot).is_empty());
    }

    #[test]
    fn test_deleted_worktree_dir_is_only_orphan_state() {
        let state = PoolState::new(2).with_assignment(assigned(1, "feat"));
        let snapshot = PoolSnapshot {
            // git still lists it until `git worktree prune`
            worktrees: registry(&[("erk-managed-wt-01", Some("feat"))]),
            slot_dirs: HashSet::new(),
            branches: ["feat".to_string()].into(),
        };

        let issues = run_sync_diagnostics(&state, &snapshot);
        assert_eq!(codes(&issues), vec![SyncIssueCode::OrphanState]);
        assert_eq!(issues[0].slot_name, "erk-managed-wt-01");
    }

    #[test]
    fn test_branch_mismatch_and_missing_branch() {
        let state = PoolState::new(3)
            .with_assignment(assigned(1, "feat"))
            .with_assignment(assigned(2, "gone"));
        let snapshot = PoolSnapshot {
            worktrees: registry(&[
                ("erk-managed-wt-01", Some("other")),
                ("erk-managed-wt-02", None),
            ]),
            slot_dirs: ["erk-managed-wt-01".to_string(), "erk-managed-wt-02".to_string()].into(),
            branches: ["feat".to_string(), "other".to_string()].into(),
        };

        let issues = run_sync_diagnostics(&state, &snapshot);
        assert_eq!(
            codes(&issues),
            vec![
                SyncIssueCode::BranchMismatch,
                SyncIssueCode::MissingBranch,
                SyncIssueCode::BranchMismatch,
            ]
        );
    }

    #[test]
    fn test_registry_missing() {
        let state = PoolState::new(2).with_assignment(assigned(1, "feat"));
        let snapshot = PoolSnapshot {
            worktrees: registry(&[]),
            slot_dirs: ["erk-managed-wt-01".to_string()].into(),
            branches: ["feat".to_string()].into(),
        };
        assert_eq!(
            codes(&run_sync_diagnostics(&state, &snapshot)),
            vec![SyncIssueCode::GitRegistryMissing]
        );
    }

    #[test]
    fn test_orphan_dir_and_untracked_worktree() {
        let mut state = PoolState::new(1);
        state.slots.push(SlotInfo::new("erk-managed-wt-01"));

        let snapshot = PoolSnapshot {
            worktrees: registry(&[
                ("erk-managed-wt-01", Some("__erk-slot-01-placeholder__")),
                ("erk-managed-wt-03", Some("x")),
                ("unrelated", Some("y")),
            ]),
            slot_dirs: ["erk-managed-wt-01".to_string(), "erk-managed-wt-02".to_string()].into(),
            branches: HashSet::new(),
        };

        let issues = run_sync_diagnostics(&state, &snapshot);
        assert_eq!(
            codes(&issues),
            vec![SyncIssueCode::OrphanDir, SyncIssueCode::UntrackedWorktree]
        );
        assert_eq!(issues[0].slot_name, "erk-managed-wt-02");
        assert_eq!(issues[1].slot_name, "erk-managed-wt-03");
    }

    #[test]
    fn test_parked_slot_without_slots_key_is_clean() {
        let state: PoolState =
            serde_json::from_str(r#"{"version":"1.0","pool_size":4,"assignments":[]}"#).unwrap();
        let snapshot = PoolSnapshot {
            worktrees: registry(&[("erk-managed-wt-01", Some("__erk-slot-01-placeholder__"))]),
            slot_dirs: ["erk-managed-wt-01".to_string()].into(),
            branches: ["main".to_string(), "__erk-slot-01-placeholder__".to_string()].into(),
        };
        assert!(run_sync_diagnostics(&state, &snapshot).is_empty());
    }

    #[test]
    fn test_unassigned_slot_on_real_branch_is_untracked() {
        let state = PoolState::new(4);
        let snapshot = PoolSnapshot {
            worktrees: registry(&[
                ("erk-managed-wt-01", Some("feat")),
                ("erk-managed-wt-02", Some("__erk-slot-01-placeholder__")),
            ]),
            slot_dirs: ["erk-managed-wt-01".to_string(), "erk-managed-wt-02".to_string()].into(),
            branches: ["feat".to_string()].into(),
        };

        let issues = run_sync_diagnostics(&state, &snapshot);
        assert_eq!(
            codes(&issues),
            vec![SyncIssueCode::UntrackedWorktree, SyncIssueCode::UntrackedWorktree]
        );
        assert_eq!(issues[0].slot_name, "erk-managed-wt-01");
        assert_eq!(issues[1].slot_name, "erk-managed-wt-02");
    }

    #[test]
    fn test_code_wire_names() {
        assert_eq!(
            serde_json::to_string(&SyncIssueCode::GitRegistryMissing).unwrap(),
            "\"git-registry-missing\""
        );
        assert_eq!(SyncIssueCode::OrphanDir.to_string(), "orphan-dir");
    }
}
