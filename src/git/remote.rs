//! Hosting-platform repository detection from remote URLs.

use crate::error::{GitError, Result};
use crate::git::GitOperations;
use regex::Regex;
use std::sync::LazyLock;

static SSH_REMOTE: LazyLock<std::result::Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(r"^(?:ssh://)?git@github\.com[:/]([^/\s]+)/([^/\s]+?)(?:\.git)?/?$")
});

static HTTPS_REMOTE: LazyLock<std::result::Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(r"^https://(?:[^@/\s]+@)?github\.com/([^/\s]+)/([^/\s]+?)(?:\.git)?/?$")
});

/// Owner and name of a GitHub repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    /// Account or organization
    pub owner: String,
    /// Repository name
    pub repo: String,
}

/// Extract owner/repository from an SSH or HTTPS GitHub remote URL
pub fn parse_github_remote(url: &str) -> Option<RepoSlug> {
    let url = url.trim();
    [&*SSH_REMOTE, &*HTTPS_REMOTE]
        .into_iter()
        .filter_map(|pattern| pattern.as_ref().ok())
        .find_map(|pattern| {
            let captures = pattern.captures(url)?;
            Some(RepoSlug {
                owner: captures.get(1)?.as_str().to_string(),
                repo: captures.get(2)?.as_str().to_string(),
            })
        })
}

/// Resolve the GitHub repository behind `remote`
pub async fn detect_repository(git: &dyn GitOperations, remote: &str) -> Result<RepoSlug> {
    let url = git.remote_url(remote).await?;
    parse_github_remote(&url).ok_or_else(|| GitError::UnsupportedRemote { url }.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slug(owner: &str, repo: &str) -> Option<RepoSlug> {
        Some(RepoSlug {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    #[test]
    fn test_ssh_and_https_remotes() {
        assert_eq!(parse_github_remote("git@github.com:acme/widget.git"), slug("acme", "widget"));
        assert_eq!(parse_github_remote("git@github.com:acme/widget"), slug("acme", "widget"));
        assert_eq!(
            parse_github_remote("ssh://git@github.com/acme/widget.git"),
            slug("acme", "widget")
        );
        assert_eq!(
            parse_github_remote("https://github.com/acme/widget.git\n"),
            slug("acme", "widget")
        );
        assert_eq!(
            parse_github_remote("https://token@github.com/acme/my.repo"),
            slug("acme", "my.repo")
        );
    }

    #[test]
    fn test_non_github_remote_rejected() {
        assert_eq!(parse_github_remote("https://gitlab.com/acme/widget.git"), None);
        assert_eq!(parse_github_remote("/srv/git/widget.git"), None);
    }
}
