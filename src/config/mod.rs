//! Persisted release configuration.
//!
//! Stored as `.kodegen-release.json` in the repository root, 2-space JSON
//! with camelCase keys.

pub mod env;

use crate::diagnostics;
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Configuration file name
pub const CONFIG_FILE: &str = ".kodegen-release.json";

/// Version written by `init` when none is given
pub const DEFAULT_VERSION: &str = "0.1.0";

/// Broad kind of project being released; drives backend recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    /// Web frontend / JavaScript package
    Frontend,
    /// Service or JVM project
    Backend,
    /// Anything else, typically a Go binary
    Other,
}

impl ProjectKind {
    /// All kinds, in display order
    pub const ALL: [ProjectKind; 3] = [ProjectKind::Frontend, ProjectKind::Backend, ProjectKind::Other];

    /// Wire name
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectKind::Frontend => "frontend",
            ProjectKind::Backend => "backend",
            ProjectKind::Other => "other",
        }
    }

    /// Backend suggested for this kind of project
    pub fn recommended_backend(self) -> &'static str {
        match self {
            ProjectKind::Frontend => "release-it",
            ProjectKind::Backend => "jreleaser",
            ProjectKind::Other => "goreleaser",
        }
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ProjectKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.to_lowercase())
            .ok_or_else(|| ConfigError::Invalid {
                reason: format!(
                    "unknown project type '{}' (expected frontend, backend or other)",
                    s
                ),
            })
    }
}

/// Persisted release configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseConfig {
    /// Repository owner on the hosting platform
    #[serde(default)]
    pub project_owner: String,
    /// Repository name on the hosting platform
    #[serde(default)]
    pub project_name: String,
    /// Project kind
    pub project_type: ProjectKind,
    /// Name of the release backend
    pub release_system: String,
    /// Current version, without a `v` prefix
    pub version: String,
}

impl ReleaseConfig {
    /// Parsed current version
    pub fn current_version(&self) -> Result<semver::Version> {
        crate::version::parse_version(&self.version)
    }

    /// Check invariants against the set of registered backend names
    pub fn validate(&self, backends: &[&str]) -> Result<()> {
        log::debug!(target: diagnostics::CONFIG, "validating release configuration");

        if self.release_system.is_empty() || !backends.contains(&self.release_system.as_str()) {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "release system '{}' is not one of: {}",
                    self.release_system,
                    backends.join(", ")
                ),
            }
            .into());
        }
        if self.version.is_empty() {
            return Err(ConfigError::Invalid {
                reason: format!("version is missing in {}", CONFIG_FILE),
            }
            .into());
        }
        if semver::Version::parse(&self.version).is_err() {
            return Err(ConfigError::Invalid {
                reason: format!("version '{}' is not a valid semantic version", self.version),
            }
            .into());
        }
        Ok(())
    }
}

/// Reads and writes the configuration file of one repository
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store for an explicit file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for the default file inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(CONFIG_FILE))
    }

    /// File location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file exists
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load and parse the configuration without validating it
    pub fn load(&self) -> Result<ReleaseConfig> {
        log::debug!(target: diagnostics::CONFIG, "loading {}", self.path.display());

        let content = std::fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: self.path.clone(),
                }
            } else {
                ConfigError::Read {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        serde_json::from_str(&content).map_err(|source| {
            ConfigError::Parse {
                path: self.path.clone(),
                source,
            }
            .into()
        })
    }

    /// Load and validate against the registered backend names
    pub fn load_valid(&self, backends: &[&str]) -> Result<ReleaseConfig> {
        let config = self.load()?;
        config.validate(backends)?;
        Ok(config)
    }

    /// Write the configuration as 2-space indented JSON
    pub fn save(&self, config: &ReleaseConfig) -> Result<()> {
        let mut content = serde_json::to_string_pretty(config)?;
        content.push('\n');
        std::fs::write(&self.path, content).map_err(|e| ConfigError::Write {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        log::debug!(target: diagnostics::CONFIG, "saved {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> ReleaseConfig {
        ReleaseConfig {
            project_owner: "acme".to_string(),
            project_name: "widget".to_string(),
            project_type: ProjectKind::Other,
            release_system: "goreleaser".to_string(),
            version: "1.2.2".to_string(),
        }
    }

    #[test]
    fn test_save_uses_camel_case_and_two_space_indent() {
        let temp = TempDir::new().unwrap();
        let store = ConfigStore::in_dir(temp.path());
        store.save(&sample()).unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("\n  \"projectOwner\": \"acme\""));
        assert!(content.contains("\"releaseSystem\": \"goreleaser\""));
        assert!(content.contains("\"projectType\": \"other\""));
        assert_eq!(store.load().unwrap(), sample());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        let err = ConfigStore::in_dir(temp.path()).load().unwrap_err();
        assert_eq!(err.code(), "CONFIG_NOT_FOUND");
    }

    #[test]
    fn test_validate_rejects_unknown_backend_and_bad_version() {
        let mut config = sample();
        assert!(config.validate(&["goreleaser"]).is_ok());
        assert!(config.validate(&["jreleaser"]).is_err());

        config.version = "1.2".to_string();
        let err = config.validate(&["goreleaser"]).unwrap_err();
        assert_eq!(err.code(), "CONFIG_INVALID");
    }

    #[test]
    fn test_project_kind_parsing() {
        assert_eq!("Backend".parse::<ProjectKind>().unwrap(), ProjectKind::Backend);
        assert!("desktop".parse::<ProjectKind>().is_err());
        assert_eq!(ProjectKind::Frontend.recommended_backend(), "release-it");
    }
}
