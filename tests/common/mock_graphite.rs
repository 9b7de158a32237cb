//! Mock Graphite gateway for testing

#![allow(dead_code)]

use async_trait::async_trait;
use erk::auth::AuthStatus;
use erk::error::{Error, Result};
use erk::graphite::GraphiteService;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Graphite gateway with scripted parents and one-shot failures
pub struct MockGraphite {
    auth: Mutex<AuthStatus>,
    parents: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<String>>,
    cache_dirs: Mutex<Vec<PathBuf>>,
    failures: Mutex<HashMap<&'static str, Error>>,
}

impl Default for MockGraphite {
    fn default() -> Self {
        Self {
            auth: Mutex::new(AuthStatus::Authenticated {
                username: String::new(),
            }),
            parents: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            cache_dirs: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
        }
    }
}

impl MockGraphite {
    /// Graphite that tracks `branch` on top of `parent`
    pub fn tracking(branch: &str, parent: &str) -> Self {
        let gt = Self::default();
        gt.set_parent(branch, parent);
        gt
    }

    pub fn set_parent(&self, branch: &str, parent: &str) {
        self.parents
            .lock()
            .unwrap()
            .insert(branch.to_string(), parent.to_string());
    }

    pub fn set_auth(&self, status: AuthStatus) {
        *self.auth.lock().unwrap() = status;
    }

    /// Make the next call to `method` fail with `err`
    pub fn fail_next(&self, method: &'static str, err: Error) {
        self.failures.lock().unwrap().insert(method, err);
    }

    /// Directories `parent_branch` was asked to read the cache from
    pub fn cache_dirs(&self) -> Vec<PathBuf> {
        self.cache_dirs.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String, method: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().remove(method) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl GraphiteService for MockGraphite {
    async fn check_auth(&self) -> Result<AuthStatus> {
        self.record("check_auth".into(), "check_auth")?;
        Ok(self.auth.lock().unwrap().clone())
    }

    async fn parent_branch(&self, git_common_dir: &Path, branch: &str) -> Result<Option<String>> {
        self.record(format!("parent_branch {branch}"), "parent_branch")?;
        self.cache_dirs
            .lock()
            .unwrap()
            .push(git_common_dir.to_path_buf());
        Ok(self.parents.lock().unwrap().get(branch).cloned())
    }

    async fn squash_branch(&self, _cwd: &Path) -> Result<()> {
        self.record("squash".into(), "squash_branch")
    }

    async fn restack(&self, _cwd: &Path) -> Result<()> {
        self.record("restack".into(), "restack")
    }

    async fn submit_stack(&self, _cwd: &Path, force: bool) -> Result<()> {
        self.record(format!("submit force={force}"), "submit_stack")
    }
}
