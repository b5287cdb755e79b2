//! GoReleaser backend.

use super::{BackendContext, BackendSupport, InitOutcome, ReleaseBackend, RollbackReport};
use crate::config::ReleaseConfig;
use crate::diagnostics::{EXEC, INIT};
use crate::error::Result;
use crate::state::{GitReleaseState, ReleaseStateTracker};
use async_trait::async_trait;
use semver::Version;
use std::sync::Arc;

const BINARY: &str = "goreleaser";
const CONFIG_FILE: &str = ".goreleaser.yaml";

/// Commits, tags and pushes, then lets `goreleaser` build and publish
pub struct GoReleaserBackend {
    support: BackendSupport,
    state: ReleaseStateTracker,
}

impl GoReleaserBackend {
    /// Backend over `ctx`
    pub fn new(ctx: Arc<BackendContext>) -> Self {
        Self {
            support: BackendSupport::new(ctx),
            state: ReleaseStateTracker::new(),
        }
    }
}

#[async_trait]
impl ReleaseBackend for GoReleaserBackend {
    fn name(&self) -> &'static str {
        "goreleaser"
    }

    fn description(&self) -> &'static str {
        "Go binaries and archives via GoReleaser"
    }

    async fn initialize(&self, _config: &ReleaseConfig) -> Result<InitOutcome> {
        self.support.require_binary(BINARY)?;

        let outcome = if self.support.work_dir().join(CONFIG_FILE).exists() {
            log::info!(target: INIT, "skipping goreleaser init, {} already exists", CONFIG_FILE);
            InitOutcome::AlreadyInitialized
        } else {
            let init = self.support.tool(BINARY, &["init"]);
            self.support.run_tool(INIT, &init).await?;
            log::info!(target: INIT, "initialized goreleaser");
            InitOutcome::Initialized
        };

        let check = self.support.tool(BINARY, &["check"]);
        self.support.run_tool(INIT, &check).await?;
        log::info!(target: INIT, "configuration check passed for goreleaser");
        Ok(outcome)
    }

    async fn release(&self, version: &Version) -> Result<()> {
        self.support.require_binary(BINARY)?;
        self.state.reset();

        self.support.record_pre_head(&self.state).await?;
        self.support.create_release_commit(version, &self.state).await?;
        let tag = self.support.create_tag(version, &self.state).await?;
        self.support.push_commit(&self.state).await?;
        self.support.push_tag(&tag, &self.state).await?;

        let rehearsal = self.support.tool(BINARY, &["release", "--snapshot", "--clean"]);
        self.support.dry_run(&rehearsal).await?;

        let release = self.support.tool(BINARY, &["release", "--clean"]);
        self.support.run_tool(EXEC, &release).await?;
        self.support.record_platform_release(&tag, &self.state);
        log::info!(target: EXEC, "goreleaser release successful");
        Ok(())
    }

    async fn revert(&self) -> Result<RollbackReport> {
        self.support.revert(&self.state).await
    }

    fn state(&self) -> GitReleaseState {
        self.state.snapshot()
    }
}
