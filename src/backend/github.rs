//! Built-in backend that publishes through the GitHub REST API.

use super::{BackendContext, BackendSupport, InitOutcome, ReleaseBackend, RollbackReport};
use crate::config::ReleaseConfig;
use crate::diagnostics::INIT;
use crate::error::Result;
use crate::state::{GitReleaseState, ReleaseStateTracker};
use async_trait::async_trait;
use semver::Version;
use std::sync::Arc;

/// Commits, tags, pushes and creates the platform release itself
pub struct GitHubBackend {
    support: BackendSupport,
    state: ReleaseStateTracker,
}

impl GitHubBackend {
    /// Backend over `ctx`
    pub fn new(ctx: Arc<BackendContext>) -> Self {
        Self {
            support: BackendSupport::new(ctx),
            state: ReleaseStateTracker::new(),
        }
    }
}

#[async_trait]
impl ReleaseBackend for GitHubBackend {
    fn name(&self) -> &'static str {
        "github"
    }

    fn description(&self) -> &'static str {
        "Tag and publish a GitHub release without an external tool"
    }

    async fn initialize(&self, _config: &ReleaseConfig) -> Result<InitOutcome> {
        self.support.require_binary("git")?;
        log::info!(target: INIT, "github backend needs no configuration");
        Ok(InitOutcome::AlreadyInitialized)
    }

    async fn release(&self, version: &Version) -> Result<()> {
        self.support.require_binary("git")?;
        self.support.platform()?.ensure_ready()?;
        self.state.reset();

        self.support.record_pre_head(&self.state).await?;
        self.support.create_release_commit(version, &self.state).await?;
        let tag = self.support.create_tag(version, &self.state).await?;
        self.support.push_commit(&self.state).await?;
        self.support.push_tag(&tag, &self.state).await?;
        self.support
            .publish_platform_release(version, &tag, &self.state)
            .await
    }

    async fn revert(&self) -> Result<RollbackReport> {
        self.support.revert(&self.state).await
    }

    fn state(&self) -> GitReleaseState {
        self.state.snapshot()
    }
}
