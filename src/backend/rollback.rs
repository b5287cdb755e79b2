//! Compensation of a partially completed release.

use crate::diagnostics::ROLLBACK;
use crate::error::{BackendError, PlatformError, ReleaseError, Result};
use crate::git::{GitConfig, GitOperations};
use crate::github::PlatformReleases;
use crate::state::GitReleaseState;

/// What a rollback did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbackReport {
    /// Compensations that were applied, in order
    pub actions: Vec<String>,
    /// Best-effort steps that did not succeed
    pub warnings: Vec<String>,
}

impl RollbackReport {
    fn action(&mut self, message: String) {
        log::info!(target: ROLLBACK, "{}", message);
        self.actions.push(message);
    }

    fn warning(&mut self, message: String) {
        log::warn!(target: ROLLBACK, "{}", message);
        self.warnings.push(message);
    }
}

fn step(action: String) -> impl FnOnce(ReleaseError) -> ReleaseError {
    move |source| ReleaseError::Rollback {
        action,
        source: Box::new(source),
    }
}

/// Undoes recorded side effects in a fixed order:
/// platform release, tags, release commit, untracked files.
pub struct RollbackCoordinator<'a> {
    git: &'a dyn GitOperations,
    platform: Option<&'a dyn PlatformReleases>,
    config: &'a GitConfig,
}

impl<'a> RollbackCoordinator<'a> {
    /// Coordinator over the given primitives
    pub fn new(
        git: &'a dyn GitOperations,
        platform: Option<&'a dyn PlatformReleases>,
        config: &'a GitConfig,
    ) -> Self {
        Self {
            git,
            platform,
            config,
        }
    }

    /// Undo whatever `state` says was done.
    ///
    /// Steps whose flag is unset are skipped. A local tag that cannot be
    /// deleted only produces a warning; every other failure stops the
    /// rollback and is returned.
    pub async fn revert(&self, state: &GitReleaseState) -> Result<RollbackReport> {
        let mut report = RollbackReport::default();
        let remote = self.config.default_remote.as_str();

        // The platform release goes first so it never points at a deleted tag
        if state.created_platform_release
            && let Some(tag) = state.platform_release_tag.as_deref().filter(|t| !t.is_empty())
        {
            let platform = self
                .platform
                .ok_or_else(|| ReleaseError::from(PlatformError::UnknownRepository))
                .map_err(step(format!("delete platform release {}", tag)))?;
            let deleted = platform
                .delete_release_by_tag(tag)
                .await
                .map_err(step(format!("delete platform release {}", tag)))?;
            if deleted {
                report.action(format!("deleted platform release {}", tag));
            } else {
                report.action(format!("no platform release for {} (nothing to delete)", tag));
            }
        }

        if let Some(tag) = state.tag_name.as_deref().filter(|t| !t.is_empty()) {
            match self.git.delete_local_tag(tag).await {
                Ok(()) => report.action(format!("deleted local tag {}", tag)),
                Err(e) => report.warning(format!("could not delete local tag {}: {}", tag, e)),
            }

            if state.pushed_tag {
                self.git
                    .delete_remote_tag(remote, tag)
                    .await
                    .map_err(step(format!("delete remote tag {}", tag)))?;
                report.action(format!("deleted remote tag {} on {}", tag, remote));
            }
        }

        if let Some(commit) = state.release_commit.as_deref().filter(|c| !c.is_empty()) {
            if state.pushed_commit {
                // Shared history cannot be rewritten, only countered
                if let Err(e) = self.git.revert_commit(commit).await {
                    report.warning(format!(
                        "git revert {} not possible ({}), adding an empty revert commit",
                        commit, e
                    ));
                    let message = self.config.revert_message(commit);
                    self.git
                        .create_empty_commit(&message)
                        .await
                        .map_err(step("create revert commit".to_string()))?;
                    report.action(format!("created revert commit for {}", commit));
                } else {
                    report.action(format!("reverted release commit {}", commit));
                }
                self.git
                    .push_head(remote)
                    .await
                    .map_err(step("push revert commit".to_string()))?;
                report.action(format!("pushed revert commit to {}", remote));
            } else if let Some(pre_head) =
                state.pre_release_head.as_deref().filter(|h| !h.is_empty())
            {
                self.git
                    .hard_reset(pre_head)
                    .await
                    .map_err(step(format!("hard reset to {}", pre_head)))?;
                report.action(format!("reset branch to {}", pre_head));
            } else {
                return Err(BackendError::InconsistentState {
                    reason: format!(
                        "release commit {} exists but no pre-release HEAD was recorded",
                        commit
                    ),
                }
                .into());
            }
        }

        self.git
            .clean_untracked()
            .await
            .map_err(step("clean untracked files".to_string()))?;
        report.action("removed untracked files".to_string());

        Ok(report)
    }
}
