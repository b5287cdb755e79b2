//! Pluggable release backends.
//!
//! A backend encapsulates "cut a release" for one external release tool.
//! Variants compose [`BackendSupport`] for the shared git/tool/rollback
//! steps and keep their own [`ReleaseStateTracker`] as rollback input.

mod github;
mod goreleaser;
mod jreleaser;
mod registry;
mod release_it;
mod rollback;
mod support;
mod tool;

pub use github::GitHubBackend;
pub use goreleaser::GoReleaserBackend;
pub use jreleaser::JReleaserBackend;
pub use registry::BackendRegistry;
pub use release_it::ReleaseItBackend;
pub use rollback::{RollbackCoordinator, RollbackReport};
pub use support::{BackendContext, BackendSupport};
pub use tool::{SystemToolRunner, ToolInvocation, ToolOutput, ToolRunner};

use crate::config::ReleaseConfig;
use crate::error::Result;
use crate::state::GitReleaseState;
use async_trait::async_trait;
use semver::Version;

/// Result of [`ReleaseBackend::initialize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// Backend configuration was generated
    Initialized,
    /// Backend configuration already existed; nothing was changed
    AlreadyInitialized,
}

/// Capability set of a release backend
#[async_trait]
pub trait ReleaseBackend: Send + Sync {
    /// Registry name, also the `releaseSystem` value in the configuration
    fn name(&self) -> &'static str;

    /// One-line description for manifests and recommendations
    fn description(&self) -> &'static str;

    /// Generate backend-specific configuration unless it already exists
    async fn initialize(&self, config: &ReleaseConfig) -> Result<InitOutcome>;

    /// Perform the release of `version`, recording each completed side effect
    async fn release(&self, version: &Version) -> Result<()>;

    /// Undo what the last `release` recorded
    async fn revert(&self) -> Result<RollbackReport>;

    /// Side effects recorded so far
    fn state(&self) -> GitReleaseState;
}
