//! Core Git operations trait and types for release management.
//!
//! This module defines the GitOperations trait that specifies all Git
//! primitives a release needs: read-only queries used by the guard and the
//! preflight checks, the side effects of a release cut, and the compensating
//! operations used by rollback. The production implementation shells out to
//! the `git` executable (see [`super::GitCli`]); tests substitute recording
//! fakes.

use crate::error::Result;
use async_trait::async_trait;

/// Trait defining all required Git operations for release management
#[async_trait]
pub trait GitOperations: Send + Sync {
    /// Full hash of HEAD
    async fn head(&self) -> Result<String>;

    /// Refresh remote references
    async fn fetch(&self) -> Result<()>;

    /// Most recent tag reachable from HEAD, `None` when there are no tags
    async fn latest_tag(&self) -> Result<Option<String>>;

    /// All tags, oldest version first
    async fn list_tags(&self) -> Result<Vec<String>>;

    /// Number of commits in `from..to`, or all commits reachable from `to`
    async fn count_commits(&self, from: Option<&str>, to: &str) -> Result<usize>;

    /// Contributors with their commit counts
    async fn contributors(&self) -> Result<Vec<Contributor>>;

    /// Check if working directory is clean
    async fn is_working_directory_clean(&self) -> Result<bool>;

    /// Current branch name, `None` when HEAD is detached
    async fn current_branch(&self) -> Result<Option<String>>;

    /// Upstream of `branch`, `None` when not configured
    async fn upstream(&self, branch: &str) -> Result<Option<String>>;

    /// Whether the current branch is behind its upstream
    async fn is_behind_upstream(&self) -> Result<bool>;

    /// URL of `remote`
    async fn remote_url(&self, remote: &str) -> Result<String>;

    /// Commit all tracked changes (allowing an empty commit) and return the new HEAD
    async fn create_release_commit(&self, message: &str) -> Result<String>;

    /// Create an empty commit
    async fn create_empty_commit(&self, message: &str) -> Result<()>;

    /// Create a lightweight tag at HEAD
    async fn create_tag(&self, tag: &str) -> Result<()>;

    /// Push HEAD to `remote`
    async fn push_head(&self, remote: &str) -> Result<()>;

    /// Push a single tag to `remote`
    async fn push_tag(&self, remote: &str, tag: &str) -> Result<()>;

    /// Delete a local tag
    async fn delete_local_tag(&self, tag: &str) -> Result<()>;

    /// Delete a tag on `remote`
    async fn delete_remote_tag(&self, remote: &str, tag: &str) -> Result<()>;

    /// Create a commit reverting `hash`
    async fn revert_commit(&self, hash: &str) -> Result<()>;

    /// Reset HEAD, index and working tree to `hash`
    async fn hard_reset(&self, hash: &str) -> Result<()>;

    /// Remove untracked files and directories
    async fn clean_untracked(&self) -> Result<()>;
}

/// A commit author and how many commits they made
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contributor {
    /// Number of commits
    pub commits: usize,
    /// `Name <email>`
    pub author: String,
}

/// Parse `git shortlog -sne` output, skipping malformed lines
pub fn parse_shortlog(output: &str) -> Vec<Contributor> {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let (count, author) = line.split_once(char::is_whitespace)?;
            let author = author.trim();
            if author.is_empty() {
                return None;
            }
            Some(Contributor {
                commits: count.parse().ok()?,
                author: author.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shortlog() {
        let output = "    42\tAda Lovelace <ada@example.com>\n     3\tGrace Hopper <grace@example.com>\n\nbogus\n";
        let contributors = parse_shortlog(output);

        assert_eq!(contributors.len(), 2);
        assert_eq!(contributors[0].commits, 42);
        assert_eq!(contributors[0].author, "Ada Lovelace <ada@example.com>");
        assert_eq!(contributors[1].commits, 3);
    }
}
