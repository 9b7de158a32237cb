//! erk - pooled worktrees and PR submission for git
//!
//! Keeps a fixed pool of reusable git worktrees, binds branches to them,
//! and submits branches as GitHub pull requests either directly or through
//! Graphite.
//!
//! The library is split along its external seams:
//! - [`git`], [`platform`], [`graphite`] - gateways over git, GitHub and `gt`
//! - [`pool`] - slot state, drift diagnostics and the slot lifecycle
//! - [`submit`] - the step pipeline behind `erk submit`
//! - [`land`], [`workflow`] - merging PRs and waiting on Actions runs

pub mod auth;
pub mod config;
pub mod error;
pub mod git;
pub mod graphite;
pub mod land;
pub mod platform;
pub mod pool;
pub mod process;
pub mod submit;
pub mod types;
pub mod workflow;
