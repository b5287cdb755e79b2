//! Configuration for Git operations.

use semver::Version;

/// Configuration for Git operations
#[derive(Debug, Clone)]
pub struct GitConfig {
    /// Default remote name for push operations
    pub default_remote: String,
    /// Custom commit message template, `{version}` is substituted
    pub commit_message_template: Option<String>,
    /// Prefix prepended to the version to form the tag name
    pub tag_prefix: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            default_remote: "origin".to_string(),
            commit_message_template: None,
            tag_prefix: "v".to_string(),
        }
    }
}

impl GitConfig {
    /// Generate commit message for release
    pub fn generate_commit_message(&self, version: &Version) -> String {
        if let Some(ref template) = self.commit_message_template {
            template.replace("{version}", &version.to_string())
        } else {
            format!("chore(release): {}", version)
        }
    }

    /// Tag name for a version
    pub fn tag_name(&self, version: &Version) -> String {
        format!("{}{}", self.tag_prefix, version)
    }

    /// Message of the empty commit that counters a pushed release commit
    pub fn revert_message(&self, hash: &str) -> String {
        format!("revert {}", hash)
    }
}
