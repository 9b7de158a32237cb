//! Branch submission pipeline
//!
//! A submit is a linear sequence of steps over a [`SubmitState`]:
//! 1. Checks - auth, branch, parent, commits, divergence
//! 2. Sync - auto-rebase, then push (or squash/restack/`gt submit`)
//! 3. PR - create or update the PR and its checkout footer
//!
//! Each step either augments the state or stops the run with a tagged
//! [`SubmitError`].

mod body;
mod graphite;
mod pipeline;
mod progress;
mod scratch;
mod state;
pub mod steps;

pub use body::{
    checkout_command, checkout_footer, ensure_checkout_footer, ensure_issue_reference,
    split_commit_message,
};
pub use pipeline::{run_submit_pipeline, SubmitContext};
pub use progress::{NoopProgress, Phase, ProgressCallback, PushStatus};
pub use scratch::{cleanup_session, session_dir, write_scratch_file};
pub use state::{StepResult, SubmitError, SubmitErrorKind, SubmitState};
