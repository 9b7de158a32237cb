//! Mock platform service for testing
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use erk::auth::AuthStatus;
use erk::error::{Error, Result};
use erk::platform::PlatformService;
use erk::types::{PlatformConfig, PrUpdate, PullRequest, WorkflowRun};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use super::fixtures::{make_pr, platform_config};

/// Call record for `create_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrCall {
    pub head: String,
    pub base: String,
    pub title: String,
    pub body: String,
}

/// Call record for `update_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePrCall {
    pub pr_number: u64,
    pub update: PrUpdate,
}

/// Call record for `dispatch_workflow`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchCall {
    pub workflow: String,
    pub git_ref: String,
    pub inputs: serde_json::Value,
}

/// In-memory GitHub
///
/// Features:
/// - Auto-incrementing PR numbers
/// - PRs created or updated through the trait are visible to later lookups
/// - Call tracking for verification
/// - One-shot error injection per method
pub struct MockPlatformService {
    config: PlatformConfig,
    next_pr_number: AtomicU64,
    auth: Mutex<AuthStatus>,
    prs: Mutex<BTreeMap<u64, PullRequest>>,
    run_polls: Mutex<VecDeque<Vec<WorkflowRun>>>,
    // Call tracking
    find_pr_calls: Mutex<Vec<String>>,
    create_pr_calls: Mutex<Vec<CreatePrCall>>,
    update_pr_calls: Mutex<Vec<UpdatePrCall>>,
    merge_calls: Mutex<Vec<u64>>,
    dispatch_calls: Mutex<Vec<DispatchCall>>,
    list_runs_calls: Mutex<u32>,
    // Error injection
    failures: Mutex<HashMap<&'static str, Error>>,
}

impl Default for MockPlatformService {
    fn default() -> Self {
        Self::with_config(platform_config())
    }
}

impl MockPlatformService {
    /// Create a new mock with the given config
    pub fn with_config(config: PlatformConfig) -> Self {
        Self {
            config,
            next_pr_number: AtomicU64::new(100),
            auth: Mutex::new(AuthStatus::Authenticated {
                username: "octocat".to_string(),
            }),
            prs: Mutex::new(BTreeMap::new()),
            run_polls: Mutex::new(VecDeque::new()),
            find_pr_calls: Mutex::new(Vec::new()),
            create_pr_calls: Mutex::new(Vec::new()),
            update_pr_calls: Mutex::new(Vec::new()),
            merge_calls: Mutex::new(Vec::new()),
            dispatch_calls: Mutex::new(Vec::new()),
            list_runs_calls: Mutex::new(0),
            failures: Mutex::new(HashMap::new()),
        }
    }

    // === Setup ===

    /// Set what `check_auth` reports
    pub fn set_auth(&self, status: AuthStatus) {
        *self.auth.lock().unwrap() = status;
    }

    /// Add an open PR
    pub fn add_pr(&self, pr: PullRequest) {
        self.prs.lock().unwrap().insert(pr.number, pr);
    }

    /// Add an open PR for `head` targeting `base`
    pub fn add_open_pr(&self, number: u64, head: &str, base: &str) -> PullRequest {
        let pr = make_pr(number, head, base);
        self.add_pr(pr.clone());
        pr
    }

    /// Current stored PR
    pub fn pr(&self, number: u64) -> Option<PullRequest> {
        self.prs.lock().unwrap().get(&number).cloned()
    }

    /// Queue the runs returned by successive `list_workflow_runs` calls
    ///
    /// The last queued poll repeats once the queue is exhausted.
    pub fn queue_run_poll(&self, runs: Vec<WorkflowRun>) {
        self.run_polls.lock().unwrap().push_back(runs);
    }

    /// Make the next call to `method` fail with `err`
    pub fn fail_next(&self, method: &'static str, err: Error) {
        self.failures.lock().unwrap().insert(method, err);
    }

    fn injected(&self, method: &'static str) -> Result<()> {
        match self.failures.lock().unwrap().remove(method) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    // === Call verification ===

    pub fn get_find_pr_calls(&self) -> Vec<String> {
        self.find_pr_calls.lock().unwrap().clone()
    }

    pub fn get_create_pr_calls(&self) -> Vec<CreatePrCall> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    pub fn get_update_pr_calls(&self) -> Vec<UpdatePrCall> {
        self.update_pr_calls.lock().unwrap().clone()
    }

    pub fn get_merge_calls(&self) -> Vec<u64> {
        self.merge_calls.lock().unwrap().clone()
    }

    pub fn get_dispatch_calls(&self) -> Vec<DispatchCall> {
        self.dispatch_calls.lock().unwrap().clone()
    }

    pub fn list_runs_call_count(&self) -> u32 {
        *self.list_runs_calls.lock().unwrap()
    }

    /// Assert that `create_pr` was called with specific head and base
    pub fn assert_create_pr_called(&self, head: &str, base: &str) {
        let calls = self.get_create_pr_calls();
        assert!(
            calls.iter().any(|c| c.head == head && c.base == base),
            "Expected create_pr({head}, {base}) but got: {calls:?}"
        );
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn check_auth(&self) -> Result<AuthStatus> {
        self.injected("check_auth")?;
        Ok(self.auth.lock().unwrap().clone())
    }

    async fn find_existing_pr(&self, head_branch: &str) -> Result<Option<PullRequest>> {
        self.find_pr_calls
            .lock()
            .unwrap()
            .push(head_branch.to_string());
        self.injected("find_existing_pr")?;

        let prs = self.prs.lock().unwrap();
        Ok(prs.values().find(|pr| pr.head_ref == head_branch).cloned())
    }

    async fn get_pr(&self, pr_number: u64) -> Result<Option<PullRequest>> {
        self.injected("get_pr")?;
        Ok(self.pr(pr_number))
    }

    async fn create_pr(&self, head: &str, base: &str, title: &str, body: &str) -> Result<PullRequest> {
        self.create_pr_calls.lock().unwrap().push(CreatePrCall {
            head: head.to_string(),
            base: base.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        });
        self.injected("create_pr")?;

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        let pr = PullRequest {
            title: title.to_string(),
            body: body.to_string(),
            ..make_pr(number, head, base)
        };
        self.add_pr(pr.clone());
        Ok(pr)
    }

    async fn update_pr(&self, pr_number: u64, update: &PrUpdate) -> Result<PullRequest> {
        self.update_pr_calls.lock().unwrap().push(UpdatePrCall {
            pr_number,
            update: update.clone(),
        });
        self.injected("update_pr")?;

        let mut prs = self.prs.lock().unwrap();
        let pr = prs
            .get_mut(&pr_number)
            .ok_or_else(|| Error::GitHubApi(format!("PR #{pr_number} not found")))?;
        if let Some(title) = &update.title {
            pr.title.clone_from(title);
        }
        if let Some(body) = &update.body {
            pr.body.clone_from(body);
        }
        if let Some(base) = &update.base {
            pr.base_ref.clone_from(base);
        }
        Ok(pr.clone())
    }

    async fn merge_pr(&self, pr_number: u64) -> Result<()> {
        self.merge_calls.lock().unwrap().push(pr_number);
        self.injected("merge_pr")?;
        self.prs.lock().unwrap().remove(&pr_number);
        Ok(())
    }

    async fn dispatch_workflow(
        &self,
        workflow: &str,
        git_ref: &str,
        inputs: &serde_json::Value,
    ) -> Result<()> {
        self.dispatch_calls.lock().unwrap().push(DispatchCall {
            workflow: workflow.to_string(),
            git_ref: git_ref.to_string(),
            inputs: inputs.clone(),
        });
        self.injected("dispatch_workflow")
    }

    async fn list_workflow_runs(&self, _workflow: &str, _branch: &str) -> Result<Vec<WorkflowRun>> {
        *self.list_runs_calls.lock().unwrap() += 1;
        self.injected("list_workflow_runs")?;

        let mut polls = self.run_polls.lock().unwrap();
        if polls.len() > 1 {
            Ok(polls.pop_front().unwrap_or_default())
        } else {
            Ok(polls.front().cloned().unwrap_or_default())
        }
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
