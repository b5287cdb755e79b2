//! Release-readiness checks run before any side effect.
//!
//! Each predicate is its own method so it can be exercised in isolation;
//! [`Preflight::check`] runs them in a fixed order and stops at the first
//! failure.

use crate::diagnostics::PREFLIGHT;
use crate::error::{PreflightError, ReleaseError, Result};
use crate::git::GitOperations;
use std::sync::Arc;

/// Branches releases may be cut from unless configured otherwise
pub const DEFAULT_RELEASE_BRANCHES: [&str; 2] = ["main", "master"];

fn inspect(check: &'static str) -> impl FnOnce(ReleaseError) -> ReleaseError {
    move |e| {
        PreflightError::Inspect {
            check,
            reason: e.to_string(),
        }
        .into()
    }
}

/// Go/no-go checks against the repository
#[derive(Clone)]
pub struct Preflight {
    git: Arc<dyn GitOperations>,
    allowed_branches: Vec<String>,
}

impl Preflight {
    /// Checker allowing the default release branches
    pub fn new(git: Arc<dyn GitOperations>) -> Self {
        Self::with_branches(git, DEFAULT_RELEASE_BRANCHES.iter().map(|b| b.to_string()).collect())
    }

    /// Checker allowing `allowed_branches`
    pub fn with_branches(git: Arc<dyn GitOperations>, allowed_branches: Vec<String>) -> Self {
        Self {
            git,
            allowed_branches,
        }
    }

    /// Run every check in order; the first failure wins
    pub async fn check(&self) -> Result<()> {
        log::info!(target: PREFLIGHT, "running pre-flight checks");
        self.ensure_clean().await?;
        let branch = self.ensure_attached().await?;
        self.ensure_release_branch(&branch)?;
        self.ensure_upstream(&branch).await?;
        self.ensure_up_to_date(&branch).await?;
        log::info!(target: PREFLIGHT, "all pre-flight checks passed");
        Ok(())
    }

    /// Working tree has no uncommitted changes
    pub async fn ensure_clean(&self) -> Result<()> {
        log::debug!(target: PREFLIGHT, "git status --porcelain (check working tree)");
        let clean = self
            .git
            .is_working_directory_clean()
            .await
            .map_err(inspect("check git status"))?;
        if !clean {
            return Err(PreflightError::UncommittedChanges.into());
        }
        log::debug!(target: PREFLIGHT, "working tree is clean");
        Ok(())
    }

    /// HEAD is on a named branch; returns the branch
    pub async fn ensure_attached(&self) -> Result<String> {
        log::debug!(target: PREFLIGHT, "git rev-parse --abbrev-ref HEAD (ensure HEAD is attached)");
        let branch = self
            .git
            .current_branch()
            .await
            .map_err(inspect("determine HEAD state"))?
            .ok_or(PreflightError::DetachedHead)?;
        log::debug!(target: PREFLIGHT, "HEAD attached to branch {}", branch);
        Ok(branch)
    }

    /// `branch` is one of the allowed release branches
    pub fn ensure_release_branch(&self, branch: &str) -> Result<()> {
        if !self.allowed_branches.iter().any(|b| b == branch) {
            return Err(PreflightError::IncorrectBranch {
                branch: branch.to_string(),
                allowed: self
                    .allowed_branches
                    .iter()
                    .map(|b| format!("'{}'", b))
                    .collect::<Vec<_>>()
                    .join(" or "),
            }
            .into());
        }
        log::debug!(target: PREFLIGHT, "on release branch {}", branch);
        Ok(())
    }

    /// `branch` tracks an upstream
    pub async fn ensure_upstream(&self, branch: &str) -> Result<String> {
        log::debug!(target: PREFLIGHT, "git for-each-ref (check upstream configuration)");
        let upstream = self
            .git
            .upstream(branch)
            .await
            .map_err(inspect("determine upstream branch"))?
            .ok_or_else(|| PreflightError::NoUpstream {
                branch: branch.to_string(),
            })?;
        log::debug!(target: PREFLIGHT, "upstream branch: {}", upstream);
        Ok(upstream)
    }

    /// `branch` is not behind its upstream
    pub async fn ensure_up_to_date(&self, branch: &str) -> Result<()> {
        log::debug!(target: PREFLIGHT, "git rev-list --count HEAD..@{{upstream}} (check branch is up to date)");
        let behind = self
            .git
            .is_behind_upstream()
            .await
            .map_err(inspect("check branch status"))?;
        if behind {
            return Err(PreflightError::BranchOutOfDate {
                branch: branch.to_string(),
            }
            .into());
        }
        log::debug!(target: PREFLIGHT, "branch is up to date with upstream");
        Ok(())
    }
}
