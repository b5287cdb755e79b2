//! Version resolution for release cuts.
//!
//! Parsing of recorded versions and published tags, and the increment
//! arithmetic that turns a current version plus a release type into the
//! next version.

mod bumper;

pub use bumper::{VersionBump, VersionBumper};

use crate::error::{Result, VersionError};
use semver::Version;

/// Parse a recorded version string
pub fn parse_version(version: &str) -> Result<Version> {
    Version::parse(version.trim()).map_err(|source| {
        VersionError::InvalidVersion {
            version: version.to_string(),
            source,
        }
        .into()
    })
}

/// Parse a tag name such as `v1.2.3`; `None` when it is not a semantic version
pub fn parse_tag(tag: &str) -> Option<Version> {
    let tag = tag.trim();
    let bare = tag.strip_prefix('v').unwrap_or(tag);
    Version::parse(bare).ok()
}
