//! release-it backend for JavaScript projects.

use super::{BackendContext, BackendSupport, InitOutcome, ReleaseBackend, RollbackReport};
use crate::config::ReleaseConfig;
use crate::diagnostics::{EXEC, INIT};
use crate::error::Result;
use crate::state::{GitReleaseState, ReleaseStateTracker};
use async_trait::async_trait;
use semver::Version;
use std::path::Path;
use std::sync::Arc;

const CONFIG_FILE: &str = ".release-it.json";

/// JavaScript package manager driving release-it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    /// npm / npx
    Npm,
    /// bun / bunx
    Bun,
}

impl PackageManager {
    /// `bun.lock` (or the binary `bun.lockb`) selects bun, anything else npm
    pub fn detect(work_dir: &Path) -> Self {
        if work_dir.join("bun.lock").exists() || work_dir.join("bun.lockb").exists() {
            PackageManager::Bun
        } else {
            PackageManager::Npm
        }
    }

    /// Package manager binary
    pub fn binary(self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Bun => "bun",
        }
    }

    /// Package runner binary
    pub fn runner(self) -> &'static str {
        match self {
            PackageManager::Npm => "npx",
            PackageManager::Bun => "bunx",
        }
    }

    /// Arguments that add a dev dependency
    pub fn install_dev(self, package: &str) -> Vec<&str> {
        match self {
            PackageManager::Npm => vec!["install", "-D", package],
            PackageManager::Bun => vec!["add", "-D", package],
        }
    }
}

fn default_config(project_name: &str) -> serde_json::Value {
    serde_json::json!({
        "$schema": "https://unpkg.com/release-it/schema/release-it.json",
        "github": {
            "release": true,
            "releaseName": format!("{}@${{version}}", project_name),
        },
        "git": {
            "commit": true,
            "tag": true,
            "push": true,
            "requireCleanWorkingDir": true,
            "commitMessage": "chore(release): ${version}",
        },
    })
}

/// Delegates commit, tag, push and publish to `release-it`
pub struct ReleaseItBackend {
    support: BackendSupport,
    state: ReleaseStateTracker,
}

impl ReleaseItBackend {
    /// Backend over `ctx`
    pub fn new(ctx: Arc<BackendContext>) -> Self {
        Self {
            support: BackendSupport::new(ctx),
            state: ReleaseStateTracker::new(),
        }
    }

    fn package_manager(&self) -> PackageManager {
        let manager = PackageManager::detect(self.support.work_dir());
        log::debug!(target: INIT, "detected package manager: {}", manager.binary());
        manager
    }
}

#[async_trait]
impl ReleaseBackend for ReleaseItBackend {
    fn name(&self) -> &'static str {
        "release-it"
    }

    fn description(&self) -> &'static str {
        "JavaScript packages via release-it"
    }

    async fn initialize(&self, config: &ReleaseConfig) -> Result<InitOutcome> {
        let manager = self.package_manager();
        self.support.require_binary(manager.binary())?;

        let path = self.support.work_dir().join(CONFIG_FILE);
        let outcome = if path.exists() {
            log::info!(target: INIT, "skipping release-it init, {} already exists", CONFIG_FILE);
            InitOutcome::AlreadyInitialized
        } else {
            if !self.support.work_dir().join("package.json").exists() {
                log::warn!(
                    target: INIT,
                    "no package.json found, this does not look like a Node.js project"
                );
            }
            let install = self
                .support
                .tool(manager.binary(), &manager.install_dev("release-it"));
            self.support.run_tool(INIT, &install).await?;

            let mut content = serde_json::to_string_pretty(&default_config(&config.project_name))?;
            content.push('\n');
            std::fs::write(&path, content)?;
            log::info!(target: INIT, "initialized release-it");
            InitOutcome::Initialized
        };

        let check = self.support.tool(manager.runner(), &["release-it", "-v"]);
        let installed = self.support.run_tool(INIT, &check).await?;
        log::info!(target: INIT, "verified release-it installation (version: {})", installed);
        Ok(outcome)
    }

    async fn release(&self, version: &Version) -> Result<()> {
        let manager = self.package_manager();
        self.support.require_binary(manager.runner())?;
        self.state.reset();

        self.support.record_pre_head(&self.state).await?;

        let version_arg = version.to_string();
        let release = self.support.tool(
            manager.runner(),
            &[
                "release-it",
                &version_arg,
                "--ci",
                "--no-git.requireCleanWorkingDir",
            ],
        );
        self.support.run_tool(EXEC, &release).await?;

        // release-it committed, tagged, pushed and published in one go
        let head = self.support.git().head().await?;
        let tag = self.support.git_config().tag_name(version);
        self.state.record(|s| {
            s.release_commit = Some(head);
            s.tag_name = Some(tag.clone());
            s.platform_release_tag = Some(tag);
            s.pushed_commit = true;
            s.pushed_tag = true;
            s.created_platform_release = true;
        });
        log::info!(target: EXEC, "release-it release successful");
        Ok(())
    }

    async fn revert(&self) -> Result<RollbackReport> {
        self.support.revert(&self.state).await
    }

    fn state(&self) -> GitReleaseState {
        self.state.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_package_manager_detection() {
        let temp = TempDir::new().unwrap();
        assert_eq!(PackageManager::detect(temp.path()), PackageManager::Npm);

        std::fs::write(temp.path().join("bun.lock"), "").unwrap();
        let manager = PackageManager::detect(temp.path());
        assert_eq!(manager, PackageManager::Bun);
        assert_eq!(manager.runner(), "bunx");
        assert_eq!(manager.install_dev("release-it"), vec!["add", "-D", "release-it"]);
    }

    #[test]
    fn test_default_config_release_name() {
        let config = default_config("widget");
        assert_eq!(config["github"]["releaseName"], "widget@${version}");
        assert_eq!(config["git"]["requireCleanWorkingDir"], true);
    }
}
