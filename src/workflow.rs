//! Dispatching GitHub Actions workflows and waiting for their runs
//!
//! `workflow_dispatch` doesn't return the run it creates, so the run is found
//! by polling the branch's runs for one created after the dispatch.

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::WorkflowRun;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Allowance for clock drift between this machine and GitHub
const DISPATCH_CLOCK_SKEW_SECS: i64 = 2;

/// How often and how long to poll for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Total polls before giving up
    pub max_attempts: u32,
    /// Polls using `fast_delay` before switching to `slow_delay`
    pub fast_attempts: u32,
    /// Delay between early polls
    pub fast_delay: Duration,
    /// Delay between later polls
    pub slow_delay: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 15,
            fast_attempts: 5,
            fast_delay: Duration::from_secs(1),
            slow_delay: Duration::from_secs(2),
        }
    }
}

impl PollPolicy {
    /// Delay to wait after the given zero-based attempt
    pub fn delay_after(&self, attempt: u32) -> Duration {
        if attempt < self.fast_attempts {
            self.fast_delay
        } else {
            self.slow_delay
        }
    }
}

/// Something that can wait
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Wait for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Whether `run` was created by a dispatch on `branch` at `dispatched_after`
pub fn matches_dispatch(run: &WorkflowRun, branch: &str, dispatched_after: DateTime<Utc>) -> bool {
    run.branch == branch && run.created_at >= dispatched_after
}

fn describe_run(run: &WorkflowRun) -> String {
    format!(
        "run {} on {} ({}) created {}",
        run.run_id,
        run.branch,
        run.status,
        run.created_at.to_rfc3339()
    )
}

/// Poll until a run for `branch` created after `dispatched_after` shows up
///
/// On exhaustion the error lists the runs seen on the last poll.
#[instrument(skip(platform, policy, sleeper))]
pub async fn wait_for_workflow_run(
    platform: &dyn PlatformService,
    workflow: &str,
    branch: &str,
    dispatched_after: DateTime<Utc>,
    policy: &PollPolicy,
    sleeper: &dyn Sleeper,
) -> Result<WorkflowRun> {
    let mut last_seen = Vec::new();

    for attempt in 0..policy.max_attempts {
        let runs = platform.list_workflow_runs(workflow, branch).await?;
        if let Some(run) = runs
            .iter()
            .find(|run| matches_dispatch(run, branch, dispatched_after))
        {
            info!("found run {} after {} poll(s)", run.run_id, attempt + 1);
            return Ok(run.clone());
        }

        debug!("attempt {}: {} run(s), none match", attempt + 1, runs.len());
        last_seen = runs;

        if attempt + 1 < policy.max_attempts {
            sleeper.sleep(policy.delay_after(attempt)).await;
        }
    }

    Err(Error::WorkflowRunNotFound {
        workflow: workflow.to_string(),
        branch: branch.to_string(),
        attempts: policy.max_attempts,
        near_misses: last_seen.iter().map(describe_run).collect(),
    })
}

/// Dispatch `workflow` on `branch` and wait for the resulting run
pub async fn trigger_and_wait(
    platform: &dyn PlatformService,
    workflow: &str,
    branch: &str,
    inputs: &serde_json::Value,
    policy: &PollPolicy,
    sleeper: &dyn Sleeper,
) -> Result<WorkflowRun> {
    let dispatched_after = Utc::now() - ChronoDuration::seconds(DISPATCH_CLOCK_SKEW_SECS);
    platform.dispatch_workflow(workflow, branch, inputs).await?;
    wait_for_workflow_run(platform, workflow, branch, dispatched_after, policy, sleeper).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn run(branch: &str, created_at: DateTime<Utc>) -> WorkflowRun {
        WorkflowRun {
            run_id: 1,
            status: "queued".to_string(),
            conclusion: None,
            branch: branch.to_string(),
            head_sha: "abc".to_string(),
            display_title: "dispatch".to_string(),
            created_at,
        }
    }

    #[test]
    fn test_delay_switches_after_fast_attempts() {
        let policy = PollPolicy::default();
        assert_eq!(policy.delay_after(0), Duration::from_secs(1));
        assert_eq!(policy.delay_after(4), Duration::from_secs(1));
        assert_eq!(policy.delay_after(5), Duration::from_secs(2));
    }

    #[test]
    fn test_matches_dispatch() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        assert!(matches_dispatch(&run("feat", t), "feat", t));
        assert!(!matches_dispatch(&run("main", t), "feat", t));
        assert!(!matches_dispatch(
            &run("feat", t - ChronoDuration::seconds(1)),
            "feat",
            t
        ));
    }
}
