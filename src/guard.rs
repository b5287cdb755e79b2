//! Version guard: refuses to release behind an already published tag.

use crate::config::ReleaseConfig;
use crate::diagnostics::GUARD;
use crate::error::{Result, VersionError};
use crate::git::GitOperations;
use crate::version::{parse_tag, parse_version};
use semver::Version;
use std::sync::Arc;

/// Compare the recorded version with the latest published tag.
///
/// No tag, or a tag that is not a semantic version, means there is nothing
/// to compare against and `local` wins.
pub fn ensure_version_is_valid(local: &Version, latest_tag: Option<&str>) -> Result<()> {
    let Some(tag) = latest_tag else {
        return Ok(());
    };
    let Some(remote) = parse_tag(tag) else {
        return Ok(());
    };
    if *local < remote {
        return Err(VersionError::Violation {
            local: local.to_string(),
            remote: remote.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Checks a configuration against the remote's tags
#[derive(Clone)]
pub struct VersionGuard {
    git: Arc<dyn GitOperations>,
}

impl VersionGuard {
    /// Guard over `git`
    pub fn new(git: Arc<dyn GitOperations>) -> Self {
        Self { git }
    }

    /// Validate `config` and return its parsed version
    pub async fn check(&self, config: &ReleaseConfig) -> Result<Version> {
        log::debug!(target: GUARD, "git fetch (updating repository information)");
        if let Err(e) = self.git.fetch().await {
            log::warn!(target: GUARD, "could not refresh remote tags, comparing against local tags: {}", e);
        }

        let local = parse_version(&config.version)?;
        let latest = self.git.latest_tag().await?;

        match latest.as_deref() {
            None => {
                log::warn!(
                    target: GUARD,
                    "no published tag found, treating {} as the first release",
                    local
                );
            }
            Some(tag) if parse_tag(tag).is_none() => {
                log::warn!(
                    target: GUARD,
                    "latest tag {} is not a semantic version, using local version {}",
                    tag,
                    local
                );
            }
            Some(tag) => {
                log::info!(target: GUARD, "local version {} / latest tag {}", local, tag);
            }
        }

        ensure_version_is_valid(&local, latest.as_deref())?;
        log::info!(target: GUARD, "version {} is valid", local);
        Ok(local)
    }
}
