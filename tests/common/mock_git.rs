//! Mock git gateway for testing

#![allow(dead_code)]

use async_trait::async_trait;
use erk::error::{Error, Result};
use erk::git::GitGateway;
use erk::types::{BranchDivergence, WorktreeInfo};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Scripted repository state
#[derive(Debug, Clone)]
pub struct GitScript {
    pub repo_root: PathBuf,
    pub git_common_dir: PathBuf,
    pub current_branch: Option<String>,
    pub trunk: String,
    pub branches: BTreeSet<String>,
    pub worktrees: Vec<WorktreeInfo>,
    pub commits_ahead: u32,
    pub divergence: BranchDivergence,
    pub head_message: String,
    pub diff: String,
    pub remote_url: String,
}

impl GitScript {
    /// A repo on `branch` with one commit ahead of `main`
    pub fn on_branch(repo_root: &Path, branch: &str) -> Self {
        Self {
            repo_root: repo_root.to_path_buf(),
            git_common_dir: repo_root.join(".git"),
            current_branch: Some(branch.to_string()),
            trunk: "main".to_string(),
            branches: ["main".to_string(), branch.to_string()].into(),
            worktrees: vec![WorktreeInfo {
                path: repo_root.to_path_buf(),
                branch: Some(branch.to_string()),
                is_root: true,
            }],
            commits_ahead: 1,
            divergence: BranchDivergence::default(),
            head_message: "Add login form\n\nWires up the form.".to_string(),
            diff: "diff --git a/login.rs b/login.rs\n".to_string(),
            remote_url: "git@github.com:acme/widgets.git".to_string(),
        }
    }
}

/// Git gateway backed by a [`GitScript`]
///
/// Every call is recorded as a short string like `push feat force=false`.
/// `add_worktree` creates the directory so on-disk checks see it.
pub struct MockGit {
    script: Mutex<GitScript>,
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<&'static str, Error>>,
}

impl MockGit {
    pub fn new(script: GitScript) -> Self {
        Self {
            script: Mutex::new(script),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Edit the scripted state
    pub fn update(&self, f: impl FnOnce(&mut GitScript)) {
        f(&mut self.script.lock().unwrap());
    }

    pub fn script(&self) -> GitScript {
        self.script.lock().unwrap().clone()
    }

    /// Make the next call to `method` fail with `err`
    pub fn fail_next(&self, method: &'static str, err: Error) {
        self.failures.lock().unwrap().insert(method, err);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded calls whose name is `method`
    pub fn calls_to(&self, method: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.split_whitespace().next() == Some(method))
            .collect()
    }

    fn record(&self, method: &'static str, detail: String) -> Result<()> {
        let entry = if detail.is_empty() {
            method.to_string()
        } else {
            format!("{method} {detail}")
        };
        self.calls.lock().unwrap().push(entry);
        match self.failures.lock().unwrap().remove(method) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl GitGateway for MockGit {
    async fn current_branch(&self, _cwd: &Path) -> Result<Option<String>> {
        self.record("current_branch", String::new())?;
        Ok(self.script().current_branch)
    }

    async fn repo_root(&self, _cwd: &Path) -> Result<PathBuf> {
        self.record("repo_root", String::new())?;
        Ok(self.script().repo_root)
    }

    async fn git_common_dir(&self, _cwd: &Path) -> Result<PathBuf> {
        self.record("git_common_dir", String::new())?;
        Ok(self.script().git_common_dir)
    }

    async fn trunk_branch(&self, _repo_root: &Path) -> Result<String> {
        self.record("trunk_branch", String::new())?;
        Ok(self.script().trunk)
    }

    async fn list_worktrees(&self, _repo_root: &Path) -> Result<Vec<WorktreeInfo>> {
        self.record("list_worktrees", String::new())?;
        Ok(self.script().worktrees)
    }

    async fn branch_head(&self, _repo_root: &Path, branch: &str) -> Result<Option<String>> {
        self.record("branch_head", branch.to_string())?;
        Ok(self
            .script()
            .branches
            .contains(branch)
            .then(|| format!("{branch}-sha")))
    }

    async fn local_branches(&self, _repo_root: &Path) -> Result<Vec<String>> {
        self.record("local_branches", String::new())?;
        Ok(self.script().branches.into_iter().collect())
    }

    async fn commits_ahead(&self, _cwd: &Path, base: &str) -> Result<u32> {
        self.record("commits_ahead", base.to_string())?;
        Ok(self.script().commits_ahead)
    }

    async fn divergence(&self, _cwd: &Path, branch: &str) -> Result<BranchDivergence> {
        self.record("divergence", branch.to_string())?;
        Ok(self.script().divergence)
    }

    async fn remote_url(&self, _cwd: &Path, remote: &str) -> Result<String> {
        self.record("remote_url", remote.to_string())?;
        Ok(self.script().remote_url)
    }

    async fn fetch(&self, _cwd: &Path) -> Result<()> {
        self.record("fetch", String::new())
    }

    async fn pull_rebase(&self, _cwd: &Path, branch: &str) -> Result<()> {
        self.record("pull_rebase", branch.to_string())
    }

    async fn push(&self, _cwd: &Path, branch: &str, force: bool) -> Result<()> {
        self.record("push", format!("{branch} force={force}"))
    }

    async fn checkout(&self, cwd: &Path, branch: &str) -> Result<()> {
        self.record("checkout", format!("{branch} in {}", cwd.display()))
    }

    async fn create_branch(&self, _repo_root: &Path, branch: &str, start_point: &str) -> Result<()> {
        self.record("create_branch", format!("{branch} from {start_point}"))?;
        self.update(|s| {
            s.branches.insert(branch.to_string());
        });
        Ok(())
    }

    async fn add_worktree(&self, _repo_root: &Path, path: &Path, branch: &str) -> Result<()> {
        self.record("add_worktree", format!("{branch} at {}", path.display()))?;
        std::fs::create_dir_all(path)?;
        self.update(|s| {
            s.worktrees.push(WorktreeInfo {
                path: path.to_path_buf(),
                branch: Some(branch.to_string()),
                is_root: false,
            });
        });
        Ok(())
    }

    async fn head_commit_message(&self, _cwd: &Path) -> Result<String> {
        self.record("head_commit_message", String::new())?;
        Ok(self.script().head_message)
    }

    async fn diff_against(&self, _cwd: &Path, base: &str) -> Result<String> {
        self.record("diff_against", base.to_string())?;
        Ok(self.script().diff)
    }
}
