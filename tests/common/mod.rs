//! Shared test support: in-memory gateways and data factories

#![allow(dead_code)]

pub mod fixtures;
pub mod mock_git;
pub mod mock_graphite;
pub mod mock_platform;

pub use fixtures::*;
pub use mock_git::{GitScript, MockGit};
pub use mock_graphite::MockGraphite;
pub use mock_platform::MockPlatformService;
