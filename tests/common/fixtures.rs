//! Test data factories for erk types

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use erk::pool::{PoolPaths, PoolState};
use erk::submit::{Phase, ProgressCallback, PushStatus, SubmitError, SubmitState};
use erk::types::{Platform, PlatformConfig, PullRequest, WorkflowRun};
use std::path::Path;
use std::sync::Mutex;

/// Platform config for `acme/widgets` on github.com
pub fn platform_config() -> PlatformConfig {
    PlatformConfig {
        platform: Platform::GitHub,
        owner: "acme".to_string(),
        repo: "widgets".to_string(),
        host: None,
    }
}

/// Open PR with an empty body
pub fn make_pr(number: u64, head: &str, base: &str) -> PullRequest {
    PullRequest {
        number,
        html_url: format!("https://github.com/acme/widgets/pull/{number}"),
        base_ref: base.to_string(),
        head_ref: head.to_string(),
        title: format!("PR for {head}"),
        body: String::new(),
    }
}

/// Workflow run on `branch`
pub fn make_run(run_id: u64, branch: &str, created_at: DateTime<Utc>) -> WorkflowRun {
    WorkflowRun {
        run_id,
        status: "queued".to_string(),
        conclusion: None,
        branch: branch.to_string(),
        head_sha: format!("sha{run_id}"),
        display_title: "erk dispatch".to_string(),
        created_at,
    }
}

/// Fresh submit state rooted at `repo_root` with trunk `main`
pub fn submit_state(repo_root: &Path) -> SubmitState {
    SubmitState::new(repo_root, repo_root, "main", "test-session")
}

/// Pool layout inside a temp directory
pub fn pool_paths(root: &Path) -> PoolPaths {
    PoolPaths {
        repo_root: root.join("repo"),
        worktrees_dir: root.join("erk/worktrees"),
        pool_file: root.join("erk/pool.json"),
    }
}

/// Empty pool of `size` slots
pub fn empty_pool(size: u32) -> PoolState {
    PoolState::new(size)
}

/// Progress callback that records every event as a string
#[derive(Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.starts_with("error "))
            .collect()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl ProgressCallback for RecordingProgress {
    async fn on_phase(&self, phase: Phase) {
        self.push(format!("phase {phase:?}"));
    }

    async fn on_push(&self, branch: &str, status: PushStatus) {
        self.push(format!("push {branch} {status}"));
    }

    async fn on_pr_created(&self, branch: &str, pr: &PullRequest) {
        self.push(format!("created {branch} #{}", pr.number));
    }

    async fn on_pr_updated(&self, branch: &str, pr: &PullRequest) {
        self.push(format!("updated {branch} #{}", pr.number));
    }

    async fn on_error(&self, error: &SubmitError) {
        self.push(format!("error {}", error.error_type));
    }

    async fn on_message(&self, message: &str) {
        self.push(format!("message {message}"));
    }
}
