//! Styled progress output for `erk submit`

use crate::cli::style::{arrow, check, cross, hyperlink_url, Stylize};
use anstream::{eprintln, println};
use async_trait::async_trait;
use erk::submit::{Phase, ProgressCallback, PushStatus, SubmitError};
use erk::types::PullRequest;

/// Progress callback that prints phases and results to the terminal
pub struct CliProgress {
    /// Also print error details
    pub verbose: bool,
}

impl CliProgress {
    /// Progress with error details
    pub const fn verbose() -> Self {
        Self { verbose: true }
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_phase(&self, phase: Phase) {
        match phase {
            Phase::Complete => println!("{} {}", check(), phase.to_string().success()),
            _ => println!("{}...", phase.to_string().emphasis()),
        }
    }

    async fn on_push(&self, branch: &str, status: PushStatus) {
        match &status {
            PushStatus::Started => {}
            PushStatus::Success => {
                println!("  {} Pushed {}", check(), branch.accent());
            }
            PushStatus::Forced => {
                println!(
                    "  {} Pushed {} {}",
                    check(),
                    branch.accent(),
                    "(forced)".warn()
                );
            }
            PushStatus::Failed(_) => {
                eprintln!(
                    "  {} Failed to push {}: {}",
                    cross(),
                    branch.accent(),
                    status.to_string().error()
                );
            }
        }
    }

    async fn on_pr_created(&self, branch: &str, pr: &PullRequest) {
        println!(
            "  {} Created PR {} for {}",
            check(),
            format!("#{}", pr.number).accent(),
            branch.emphasis()
        );
        println!("    {}", hyperlink_url(&pr.html_url));
    }

    async fn on_pr_updated(&self, branch: &str, pr: &PullRequest) {
        println!(
            "  {} Updated PR {} for {}",
            check(),
            format!("#{}", pr.number).accent(),
            branch.emphasis()
        );
    }

    async fn on_error(&self, error: &SubmitError) {
        eprintln!(
            "{} {}: {}",
            cross(),
            error.error_type.as_str().error(),
            error.message
        );
        if self.verbose {
            for (key, value) in &error.details {
                eprintln!("    {}: {}", key.muted(), value);
            }
        }
    }

    async fn on_message(&self, message: &str) {
        println!("  {} {}", arrow(), message);
    }
}
