//! JReleaser backend.

use super::{
    BackendContext, BackendSupport, InitOutcome, ReleaseBackend, RollbackReport, ToolInvocation,
};
use crate::config::{ReleaseConfig, env};
use crate::diagnostics::{EXEC, INIT};
use crate::error::{BackendError, Result};
use crate::state::{GitReleaseState, ReleaseStateTracker};
use async_trait::async_trait;
use chrono::Datelike;
use semver::Version;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

const BINARY: &str = "jreleaser";
const CONFIG_FILE: &str = "jreleaser.yml";

#[derive(Serialize)]
struct JReleaserConfig {
    project: Project,
    release: Release,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Project {
    name: String,
    version: String,
    authors: Vec<String>,
    license: String,
    inception_year: String,
    languages: Languages,
}

#[derive(Serialize)]
struct Languages {
    java: Java,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Java {
    group_id: String,
    version: String,
}

#[derive(Serialize)]
struct Release {
    github: GitHubRelease,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GitHubRelease {
    owner: String,
    name: String,
    tag_name: String,
    release_name: String,
    overwrite: bool,
    changelog: Changelog,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Changelog {
    enabled: bool,
    sort: String,
    formatted: String,
    preset: String,
    skip_merge_commits: bool,
    append: ChangelogAppend,
}

#[derive(Serialize)]
struct ChangelogAppend {
    enabled: bool,
    title: String,
    target: String,
}

impl JReleaserConfig {
    fn for_project(config: &ReleaseConfig) -> Self {
        Self {
            project: Project {
                name: config.project_name.clone(),
                version: config.version.clone(),
                authors: vec![config.project_owner.clone()],
                license: "Proprietary".to_string(),
                inception_year: chrono::Utc::now().year().to_string(),
                languages: Languages {
                    java: Java {
                        group_id: format!("io.{}", config.project_owner.to_lowercase()),
                        version: "21".to_string(),
                    },
                },
            },
            release: Release {
                github: GitHubRelease {
                    owner: config.project_owner.clone(),
                    name: config.project_name.clone(),
                    tag_name: "v{{projectVersion}}".to_string(),
                    release_name: format!("{}@{{{{projectVersion}}}}", config.project_name),
                    overwrite: false,
                    changelog: Changelog {
                        enabled: true,
                        sort: "DESC".to_string(),
                        formatted: "ALWAYS".to_string(),
                        preset: "conventional-commits".to_string(),
                        skip_merge_commits: true,
                        append: ChangelogAppend {
                            enabled: true,
                            title: "## [{{tagName}}]".to_string(),
                            target: "CHANGELOG.md".to_string(),
                        },
                    },
                },
            },
        }
    }
}

/// Set `project.version` in an existing jreleaser.yml, keeping everything else
fn sync_version(path: &Path, version: &Version) -> Result<()> {
    let failed = |reason: String| BackendError::InitFailed {
        backend: "jreleaser".to_string(),
        reason,
    };

    let content = std::fs::read_to_string(path)
        .map_err(|e| failed(format!("{} not readable ({}), run init first", CONFIG_FILE, e)))?;
    let mut document: serde_yaml_ng::Value = serde_yaml_ng::from_str(&content)
        .map_err(|e| failed(format!("{} is not valid YAML: {}", CONFIG_FILE, e)))?;

    let project = document
        .get_mut("project")
        .and_then(serde_yaml_ng::Value::as_mapping_mut)
        .ok_or_else(|| failed(format!("{} has no project section", CONFIG_FILE)))?;
    project.insert(
        serde_yaml_ng::Value::String("version".to_string()),
        serde_yaml_ng::Value::String(version.to_string()),
    );

    let updated = serde_yaml_ng::to_string(&document)
        .map_err(|e| failed(format!("serializing {}: {}", CONFIG_FILE, e)))?;
    std::fs::write(path, updated)?;
    Ok(())
}

/// Commits and pushes, then lets `jreleaser full-release` tag and publish
pub struct JReleaserBackend {
    support: BackendSupport,
    state: ReleaseStateTracker,
}

impl JReleaserBackend {
    /// Backend over `ctx`
    pub fn new(ctx: Arc<BackendContext>) -> Self {
        Self {
            support: BackendSupport::new(ctx),
            state: ReleaseStateTracker::new(),
        }
    }

    fn jreleaser(&self, args: &[&str], token: Option<&str>) -> ToolInvocation {
        let invocation = self.support.tool(BINARY, args);
        match token {
            Some(token) => invocation.env(env::JRELEASER_GITHUB_TOKEN, token),
            None => invocation,
        }
    }
}

#[async_trait]
impl ReleaseBackend for JReleaserBackend {
    fn name(&self) -> &'static str {
        "jreleaser"
    }

    fn description(&self) -> &'static str {
        "JVM projects via JReleaser"
    }

    async fn initialize(&self, config: &ReleaseConfig) -> Result<InitOutcome> {
        self.support.require_binary(BINARY)?;
        log::debug!(
            target: INIT,
            "initializing jreleaser for {}@{}",
            config.project_name,
            config.version
        );

        let path = self.support.work_dir().join(CONFIG_FILE);
        let outcome = if path.exists() {
            log::info!(target: INIT, "skipping jreleaser init, {} already exists", CONFIG_FILE);
            InitOutcome::AlreadyInitialized
        } else {
            let yaml = serde_yaml_ng::to_string(&JReleaserConfig::for_project(config)).map_err(|e| {
                BackendError::InitFailed {
                    backend: self.name().to_string(),
                    reason: e.to_string(),
                }
            })?;
            std::fs::write(&path, yaml)?;
            log::info!(target: INIT, "generated {} for {}", CONFIG_FILE, config.project_name);
            InitOutcome::Initialized
        };

        let token = env::github_token().ok();
        let check = self.jreleaser(&["config"], token.as_deref());
        self.support.run_tool(INIT, &check).await?;
        log::info!(target: INIT, "configuration check passed for jreleaser");
        Ok(outcome)
    }

    async fn release(&self, version: &Version) -> Result<()> {
        self.support.require_binary(BINARY)?;
        let token = env::github_token()?;
        self.state.reset();

        self.support.record_pre_head(&self.state).await?;
        sync_version(&self.support.work_dir().join(CONFIG_FILE), version)?;
        log::info!(target: EXEC, "jreleaser version updated to {}", version);

        self.support.create_release_commit(version, &self.state).await?;
        self.support.push_commit(&self.state).await?;

        let rehearsal = self.jreleaser(&["full-release", "--dry-run"], Some(&token));
        self.support.dry_run(&rehearsal).await?;

        // jreleaser creates and pushes the tag itself
        let tag = self.support.git_config().tag_name(version);
        self.state.record(|s| s.tag_name = Some(tag.clone()));

        let release = self.jreleaser(&["full-release"], Some(&token));
        self.support.run_tool(EXEC, &release).await?;
        self.state.record(|s| s.pushed_tag = true);
        self.support.record_platform_release(&tag, &self.state);
        log::info!(target: EXEC, "jreleaser release successful");
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
    use crate::config::ProjectKind;
    use tempfile::TempDir;

    fn config() -> ReleaseConfig {
        ReleaseConfig {
            project_owner: "acme".to_string(),
            project_name: "ledger".to_string(),
            project_type: ProjectKind::Backend,
            release_system: "jreleaser".to_string(),
            version: "0.3.0".to_string(),
        }
    }

    #[test]
    fn test_generated_config_shape() {
        let yaml = serde_yaml_ng::to_string(&JReleaserConfig::for_project(&config())).unwrap();
        let document: serde_yaml_ng::Value = serde_yaml_ng::from_str(&yaml).unwrap();
        let github = &document["release"]["github"];

        assert!(document["project"]["inceptionYear"].as_str().is_some());
        assert_eq!(document["project"]["version"].as_str(), Some("0.3.0"));
        assert_eq!(github["tagName"].as_str(), Some("v{{projectVersion}}"));
        assert_eq!(github["releaseName"].as_str(), Some("ledger@{{projectVersion}}"));
    }

    #[test]
    fn test_sync_version_keeps_other_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            "project:\n  name: ledger\n  version: 0.3.0\n  custom: keep-me\nrelease:\n  github:\n    owner: acme\n",
        )
        .unwrap();

        sync_version(&path, &Version::new(0, 4, 0)).unwrap();

        let document: serde_yaml_ng::Value =
            serde_yaml_ng::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(document["project"]["version"].as_str(), Some("0.4.0"));
        assert_eq!(document["project"]["custom"].as_str(), Some("keep-me"));
        assert_eq!(document["release"]["github"]["owner"].as_str(), Some("acme"));
    }

    #[test]
    fn test_sync_version_requires_project_section() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        std::fs::write(&path, "release: {}\n").unwrap();
        assert!(sync_version(&path, &Version::new(1, 0, 0)).is_err());
    }
}
