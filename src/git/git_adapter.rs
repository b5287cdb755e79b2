//! GitOperations backed by the `git` executable.

use crate::error::{GitError, Result};
use crate::git::{Contributor, GitOperations, parse_shortlog};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;

/// Git operations run as `git` subprocesses inside one working directory
#[derive(Debug, Clone)]
pub struct GitCli {
    work_dir: PathBuf,
}

impl GitCli {
    /// Operate on the repository at `work_dir`
    pub fn new<P: AsRef<Path>>(work_dir: P) -> Self {
        Self {
            work_dir: work_dir.as_ref().to_path_buf(),
        }
    }

    /// Repository working directory
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    async fn output(&self, args: &[&str]) -> Result<Output> {
        let command = format!("git {}", args.join(" "));
        log::trace!("{}", command);

        Command::new("git")
            .args(args)
            .current_dir(&self.work_dir)
            .output()
            .await
            .map_err(|source| GitError::Spawn { command, source }.into())
    }

    /// Run and return trimmed stdout; a non-zero exit becomes `CommandFailed`
    async fn run(&self, args: &[&str]) -> Result<String> {
        let output = self.output(args).await?;
        if !output.status.success() {
            return Err(failure(args, &output).into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

fn failure(args: &[&str], output: &Output) -> GitError {
    let mut text = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if text.is_empty() {
        text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    }
    GitError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        stderr: text,
    }
}

fn parse_count(command: &str, output: &str) -> Result<usize> {
    output.trim().parse().map_err(|_| {
        GitError::UnexpectedOutput {
            command: command.to_string(),
            output: output.to_string(),
        }
        .into()
    })
}

#[async_trait]
impl GitOperations for GitCli {
    async fn head(&self) -> Result<String> {
        self.run(&["rev-parse", "HEAD"]).await
    }

    async fn fetch(&self) -> Result<()> {
        self.run(&["fetch", "--tags"]).await.map(drop)
    }

    async fn latest_tag(&self) -> Result<Option<String>> {
        let output = self.output(&["describe", "--tags", "--abbrev=0"]).await?;
        if !output.status.success() {
            // `describe` fails when no tag is reachable
            log::trace!(
                "git describe: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(None);
        }
        let tag = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Some(tag).filter(|t| !t.is_empty()))
    }

    async fn list_tags(&self) -> Result<Vec<String>> {
        let output = self.run(&["tag", "--sort=v:refname"]).await?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn count_commits(&self, from: Option<&str>, to: &str) -> Result<usize> {
        let range = match from {
            Some(from) => format!("{}..{}", from, to),
            None => to.to_string(),
        };
        let output = self.run(&["rev-list", "--count", &range]).await?;
        parse_count("git rev-list --count", &output)
    }

    async fn contributors(&self) -> Result<Vec<Contributor>> {
        let output = self.run(&["shortlog", "-sne", "HEAD"]).await?;
        Ok(parse_shortlog(&output))
    }

    async fn is_working_directory_clean(&self) -> Result<bool> {
        let output = self.run(&["status", "--porcelain"]).await?;
        Ok(output.is_empty())
    }

    async fn current_branch(&self) -> Result<Option<String>> {
        let branch = self.run(&["rev-parse", "--abbrev-ref", "HEAD"]).await?;
        Ok(Some(branch).filter(|b| b != "HEAD"))
    }

    async fn upstream(&self, branch: &str) -> Result<Option<String>> {
        let reference = format!("refs/heads/{}", branch);
        let upstream = self
            .run(&["for-each-ref", "--format=%(upstream:short)", &reference])
            .await?;
        Ok(Some(upstream).filter(|u| !u.is_empty()))
    }

    async fn is_behind_upstream(&self) -> Result<bool> {
        let output = self.run(&["rev-list", "--count", "HEAD..@{upstream}"]).await?;
        Ok(parse_count("git rev-list --count HEAD..@{upstream}", &output)? > 0)
    }

    async fn remote_url(&self, remote: &str) -> Result<String> {
        self.run(&["remote", "get-url", remote]).await
    }

    async fn create_release_commit(&self, message: &str) -> Result<String> {
        self.run(&["commit", "--allow-empty", "-a", "-m", message])
            .await?;
        self.head().await
    }

    async fn create_empty_commit(&self, message: &str) -> Result<()> {
        self.run(&["commit", "--allow-empty", "-m", message])
            .await
            .map(drop)
    }

    async fn create_tag(&self, tag: &str) -> Result<()> {
        self.run(&["tag", tag]).await.map(drop)
    }

    async fn push_head(&self, remote: &str) -> Result<()> {
        self.run(&["push", remote, "HEAD"]).await.map(drop)
    }

    async fn push_tag(&self, remote: &str, tag: &str) -> Result<()> {
        self.run(&["push", remote, tag]).await.map(drop)
    }

    async fn delete_local_tag(&self, tag: &str) -> Result<()> {
        self.run(&["tag", "-d", tag]).await.map(drop)
    }

    async fn delete_remote_tag(&self, remote: &str, tag: &str) -> Result<()> {
        self.run(&["push", remote, "--delete", tag]).await.map(drop)
    }

    async fn revert_commit(&self, hash: &str) -> Result<()> {
        self.run(&["revert", "--no-edit", hash]).await.map(drop)
    }

    async fn hard_reset(&self, hash: &str) -> Result<()> {
        self.run(&["reset", "--hard", hash]).await.map(drop)
    }

    async fn clean_untracked(&self) -> Result<()> {
        self.run(&["clean", "-fd"]).await.map(drop)
    }
}
