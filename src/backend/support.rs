//! Shared building blocks composed into every backend variant.

use super::rollback::{RollbackCoordinator, RollbackReport};
use super::tool::{ToolInvocation, ToolOutput, ToolRunner};
use crate::diagnostics::{EXEC, INIT};
use crate::error::{BackendError, PlatformError, Result};
use crate::git::{GitConfig, GitOperations};
use crate::github::{NewRelease, PlatformReleases};
use crate::state::ReleaseStateTracker;
use semver::Version;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything a backend needs from its environment
#[derive(Clone)]
pub struct BackendContext {
    /// Repository working directory
    pub work_dir: PathBuf,
    /// Git primitives
    pub git: Arc<dyn GitOperations>,
    /// Platform release API, `None` when the repository is unknown
    pub platform: Option<Arc<dyn PlatformReleases>>,
    /// External tool runner
    pub tools: Arc<dyn ToolRunner>,
    /// Remote, commit message and tag naming
    pub git_config: GitConfig,
}

/// Binary checks, tool runs, commit/tag/push steps and rollback, recording
/// each completed side effect into the caller's tracker.
#[derive(Clone)]
pub struct BackendSupport {
    ctx: Arc<BackendContext>,
}

impl BackendSupport {
    /// Helper over a shared context
    pub fn new(ctx: Arc<BackendContext>) -> Self {
        Self { ctx }
    }

    /// Repository working directory
    pub fn work_dir(&self) -> &Path {
        &self.ctx.work_dir
    }

    /// Git configuration
    pub fn git_config(&self) -> &GitConfig {
        &self.ctx.git_config
    }

    /// Git primitives
    pub fn git(&self) -> &dyn GitOperations {
        self.ctx.git.as_ref()
    }

    /// Platform client, required
    pub fn platform(&self) -> Result<&dyn PlatformReleases> {
        self.ctx
            .platform
            .as_deref()
            .ok_or_else(|| PlatformError::UnknownRepository.into())
    }

    /// Fail unless `binary` is on PATH
    pub fn require_binary(&self, binary: &str) -> Result<PathBuf> {
        log::debug!(target: INIT, "searching for {} executable", binary);
        let path = self
            .ctx
            .tools
            .locate(binary)
            .ok_or_else(|| BackendError::MissingDependency {
                binary: binary.to_string(),
            })?;
        log::debug!(target: INIT, "found {} at {}", binary, path.display());
        Ok(path)
    }

    /// Invocation of `program` in the working directory
    pub fn tool(&self, program: &str, args: &[&str]) -> ToolInvocation {
        ToolInvocation::new(program, args, &self.ctx.work_dir)
    }

    /// Run a tool whose failure aborts the current operation
    pub async fn run_tool(&self, category: &str, invocation: &ToolInvocation) -> Result<String> {
        log::debug!(target: category, "running {}", invocation);
        let ToolOutput { success, output } = self.ctx.tools.run(invocation).await?;
        if !success {
            return Err(BackendError::ToolFailed {
                tool: invocation.to_string(),
                output,
            }
            .into());
        }
        Ok(output)
    }

    /// Run a rehearsal; a failure is only a warning
    pub async fn dry_run(&self, invocation: &ToolInvocation) -> Result<bool> {
        log::debug!(target: EXEC, "dry run: {}", invocation);
        let ToolOutput { success, output } = self.ctx.tools.run(invocation).await?;
        if success {
            log::info!(target: EXEC, "dry run passed");
        } else {
            log::warn!(
                target: EXEC,
                "dry run did not pass, continuing with the release: {}",
                output
            );
        }
        Ok(success)
    }

    /// Record HEAD before anything changes
    pub async fn record_pre_head(&self, tracker: &ReleaseStateTracker) -> Result<String> {
        let head = self.git().head().await?;
        tracker.record(|s| s.pre_release_head = Some(head.clone()));
        Ok(head)
    }

    /// Create the release commit
    pub async fn create_release_commit(
        &self,
        version: &Version,
        tracker: &ReleaseStateTracker,
    ) -> Result<String> {
        let message = self.git_config().generate_commit_message(version);
        log::debug!(target: EXEC, "git commit --allow-empty -a -m \"{}\"", message);
        let head = self.git().create_release_commit(&message).await?;
        tracker.record(|s| s.release_commit = Some(head.clone()));
        log::info!(target: EXEC, "created release commit: {}", message);
        Ok(head)
    }

    /// Tag HEAD for `version`
    pub async fn create_tag(&self, version: &Version, tracker: &ReleaseStateTracker) -> Result<String> {
        let tag = self.git_config().tag_name(version);
        log::debug!(target: EXEC, "git tag {}", tag);
        self.git().create_tag(&tag).await?;
        tracker.record(|s| {
            s.tag_name = Some(tag.clone());
            s.platform_release_tag = Some(tag.clone());
        });
        log::info!(target: EXEC, "created tag {}", tag);
        Ok(tag)
    }

    /// Push the release commit
    pub async fn push_commit(&self, tracker: &ReleaseStateTracker) -> Result<()> {
        let remote = &self.git_config().default_remote;
        log::debug!(target: EXEC, "git push {} HEAD", remote);
        self.git().push_head(remote).await?;
        tracker.record(|s| s.pushed_commit = true);
        log::info!(target: EXEC, "pushed release commit to {}", remote);
        Ok(())
    }

    /// Push the tag created by [`Self::create_tag`]
    pub async fn push_tag(&self, tag: &str, tracker: &ReleaseStateTracker) -> Result<()> {
        let remote = &self.git_config().default_remote;
        log::debug!(target: EXEC, "git push {} {}", remote, tag);
        self.git().push_tag(remote, tag).await?;
        tracker.record(|s| s.pushed_tag = true);
        log::info!(target: EXEC, "pushed tag {}", tag);
        Ok(())
    }

    /// Publish a platform release for `tag` through the API
    pub async fn publish_platform_release(
        &self,
        version: &Version,
        tag: &str,
        tracker: &ReleaseStateTracker,
    ) -> Result<()> {
        let release = self
            .platform()?
            .create_release(&NewRelease::for_version(version, tag))
            .await?;
        tracker.record(|s| {
            s.platform_release_tag = Some(tag.to_string());
            s.created_platform_release = true;
        });
        log::info!(target: EXEC, "published platform release {}", release.html_url);
        Ok(())
    }

    /// Record a platform release an external tool published for `tag`.
    /// Call only once the tool has succeeded.
    pub fn record_platform_release(&self, tag: &str, tracker: &ReleaseStateTracker) {
        tracker.record(|s| {
            s.platform_release_tag = Some(tag.to_string());
            s.created_platform_release = true;
        });
    }

    /// Undo everything in `tracker`, then clear it
    pub async fn revert(&self, tracker: &ReleaseStateTracker) -> Result<RollbackReport> {
        let state = tracker.snapshot();
        log::info!(target: crate::diagnostics::ROLLBACK, "rolling back release");
        let coordinator = RollbackCoordinator::new(
            self.git(),
            self.ctx.platform.as_deref(),
            self.git_config(),
        );
        let report = coordinator.revert(&state).await?;
        tracker.reset();
        Ok(report)
    }
}
