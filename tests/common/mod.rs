//! Recording fakes shared by the integration tests.
//!
//! Every fake appends to one [`CallLog`] so tests can assert on the
//! interleaving of git, platform and tool calls.

#![allow(dead_code)]

use async_trait::async_trait;
use kodegen_release::backend::{BackendContext, ToolInvocation, ToolOutput, ToolRunner};
use kodegen_release::config::{ConfigStore, ProjectKind, ReleaseConfig};
use kodegen_release::error::{GitError, PlatformError, Result};
use kodegen_release::git::{Contributor, GitConfig, GitOperations};
use kodegen_release::github::{NewRelease, PlatformReleases, PublishedRelease};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Index of the first call starting with `prefix`
pub fn position(log: &CallLog, prefix: &str) -> Option<usize> {
    calls(log).iter().position(|c| c.starts_with(prefix))
}

/// Whether any call starts with `prefix`
pub fn called(log: &CallLog, prefix: &str) -> bool {
    position(log, prefix).is_some()
}

/// Repository state served by [`FakeGit`]
#[derive(Debug, Clone)]
pub struct Repo {
    pub head: String,
    pub clean: bool,
    pub branch: Option<String>,
    pub upstream: Option<String>,
    pub behind: bool,
    pub tags: Vec<String>,
    pub remote_url: String,
    pub contributors: Vec<Contributor>,
    /// Operations that fail, by method name
    pub failing: Vec<&'static str>,
    pub commits: usize,
}

impl Default for Repo {
    fn default() -> Self {
        Self {
            head: "base000".to_string(),
            clean: true,
            branch: Some("main".to_string()),
            upstream: Some("origin/main".to_string()),
            behind: false,
            tags: Vec::new(),
            remote_url: "git@github.com:acme/widget.git".to_string(),
            contributors: Vec::new(),
            failing: Vec::new(),
            commits: 0,
        }
    }
}

pub struct FakeGit {
    log: CallLog,
    repo: Mutex<Repo>,
}

impl FakeGit {
    pub fn new(log: CallLog, repo: Repo) -> Self {
        Self {
            log,
            repo: Mutex::new(repo),
        }
    }

    pub fn repo(&self) -> Repo {
        self.repo.lock().unwrap().clone()
    }

    fn call(&self, op: &'static str, detail: &str) -> Result<()> {
        let entry = if detail.is_empty() {
            format!("git.{}", op)
        } else {
            format!("git.{} {}", op, detail)
        };
        self.log.lock().unwrap().push(entry);
        if self.repo.lock().unwrap().failing.contains(&op) {
            return Err(GitError::CommandFailed {
                command: format!("git {}", op),
                stderr: "simulated failure".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl GitOperations for FakeGit {
    async fn head(&self) -> Result<String> {
        self.call("head", "")?;
        Ok(self.repo().head)
    }

    async fn fetch(&self) -> Result<()> {
        self.call("fetch", "")
    }

    async fn latest_tag(&self) -> Result<Option<String>> {
        self.call("latest_tag", "")?;
        Ok(self.repo().tags.last().cloned())
    }

    async fn list_tags(&self) -> Result<Vec<String>> {
        self.call("list_tags", "")?;
        Ok(self.repo().tags)
    }

    async fn count_commits(&self, from: Option<&str>, to: &str) -> Result<usize> {
        self.call("count_commits", &format!("{}..{}", from.unwrap_or(""), to))?;
        Ok(if from.is_some() { 2 } else { 5 })
    }

    async fn contributors(&self) -> Result<Vec<Contributor>> {
        self.call("contributors", "")?;
        Ok(self.repo().contributors)
    }

    async fn is_working_directory_clean(&self) -> Result<bool> {
        self.call("status", "")?;
        Ok(self.repo().clean)
    }

    async fn current_branch(&self) -> Result<Option<String>> {
        self.call("current_branch", "")?;
        Ok(self.repo().branch)
    }

    async fn upstream(&self, branch: &str) -> Result<Option<String>> {
        self.call("upstream", branch)?;
        Ok(self.repo().upstream)
    }

    async fn is_behind_upstream(&self) -> Result<bool> {
        self.call("behind", "")?;
        Ok(self.repo().behind)
    }

    async fn remote_url(&self, remote: &str) -> Result<String> {
        self.call("remote_url", remote)?;
        Ok(self.repo().remote_url)
    }

    async fn create_release_commit(&self, message: &str) -> Result<String> {
        self.call("commit", message)?;
        let mut repo = self.repo.lock().unwrap();
        repo.commits += 1;
        repo.head = format!("release{:03}", repo.commits);
        Ok(repo.head.clone())
    }

    async fn create_empty_commit(&self, message: &str) -> Result<()> {
        self.call("empty_commit", message)
    }

    async fn create_tag(&self, tag: &str) -> Result<()> {
        self.call("tag", tag)?;
        self.repo.lock().unwrap().tags.push(tag.to_string());
        Ok(())
    }

    async fn push_head(&self, remote: &str) -> Result<()> {
        self.call("push_head", remote)
    }

    async fn push_tag(&self, remote: &str, tag: &str) -> Result<()> {
        self.call("push_tag", &format!("{} {}", remote, tag))
    }

    async fn delete_local_tag(&self, tag: &str) -> Result<()> {
        self.call("delete_local_tag", tag)?;
        self.repo.lock().unwrap().tags.retain(|t| t != tag);
        Ok(())
    }

    async fn delete_remote_tag(&self, remote: &str, tag: &str) -> Result<()> {
        self.call("delete_remote_tag", &format!("{} {}", remote, tag))
    }

    async fn revert_commit(&self, hash: &str) -> Result<()> {
        self.call("revert", hash)
    }

    async fn hard_reset(&self, hash: &str) -> Result<()> {
        self.call("reset", hash)?;
        self.repo.lock().unwrap().head = hash.to_string();
        Ok(())
    }

    async fn clean_untracked(&self) -> Result<()> {
        self.call("clean", "")
    }
}

pub struct FakePlatform {
    log: CallLog,
    pub fail_create: bool,
}

impl FakePlatform {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            fail_create: false,
        }
    }
}

#[async_trait]
impl PlatformReleases for FakePlatform {
    async fn create_release(&self, release: &NewRelease) -> Result<PublishedRelease> {
        self.log
            .lock()
            .unwrap()
            .push(format!("platform.create {}", release.tag_name));
        if self.fail_create {
            return Err(PlatformError::Api {
                action: format!("create release {}", release.tag_name),
                status: 422,
                body: "Validation Failed".to_string(),
            }
            .into());
        }
        Ok(PublishedRelease {
            id: 1,
            html_url: format!("https://github.com/acme/widget/releases/tag/{}", release.tag_name),
            tag_name: release.tag_name.clone(),
        })
    }

    async fn delete_release_by_tag(&self, tag: &str) -> Result<bool> {
        self.log.lock().unwrap().push(format!("platform.delete {}", tag));
        Ok(true)
    }
}

/// Tool runner that finds every binary and fails invocations matching a pattern
pub struct FakeTools {
    log: CallLog,
    pub missing: Vec<&'static str>,
    pub failing: Vec<&'static str>,
}

impl FakeTools {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            missing: Vec::new(),
            failing: Vec::new(),
        }
    }
}

#[async_trait]
impl ToolRunner for FakeTools {
    fn locate(&self, binary: &str) -> Option<PathBuf> {
        if self.missing.contains(&binary) {
            None
        } else {
            Some(PathBuf::from("/usr/bin").join(binary))
        }
    }

    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput> {
        let shown = invocation.to_string();
        self.log.lock().unwrap().push(format!("tool {}", shown));
        let success = !self.failing.iter().any(|pattern| shown.contains(pattern));
        Ok(ToolOutput {
            success,
            output: if success { "ok".to_string() } else { "tool exploded".to_string() },
        })
    }
}

/// Wiring of fakes around one temporary working directory
pub struct Fixture {
    pub log: CallLog,
    pub git: Arc<FakeGit>,
    pub platform: Arc<FakePlatform>,
    pub tools: Arc<FakeTools>,
    pub dir: tempfile::TempDir,
}

impl Fixture {
    pub fn new(repo: Repo) -> Self {
        Self::with(repo, |_| {}, |_| {})
    }

    pub fn with(
        repo: Repo,
        platform: impl FnOnce(&mut FakePlatform),
        tools: impl FnOnce(&mut FakeTools),
    ) -> Self {
        let log = call_log();
        let mut fake_platform = FakePlatform::new(log.clone());
        platform(&mut fake_platform);
        let mut fake_tools = FakeTools::new(log.clone());
        tools(&mut fake_tools);
        Self {
            git: Arc::new(FakeGit::new(log.clone(), repo)),
            platform: Arc::new(fake_platform),
            tools: Arc::new(fake_tools),
            dir: tempfile::TempDir::new().unwrap(),
            log,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn context(&self) -> Arc<BackendContext> {
        Arc::new(BackendContext {
            work_dir: self.path().to_path_buf(),
            git: self.git.clone(),
            platform: Some(self.platform.clone()),
            tools: self.tools.clone(),
            git_config: GitConfig::default(),
        })
    }

    /// Context for a repository whose platform is unknown
    pub fn context_without_platform(&self) -> Arc<BackendContext> {
        Arc::new(BackendContext {
            platform: None,
            ..(*self.context()).clone()
        })
    }

    pub fn store(&self) -> ConfigStore {
        ConfigStore::in_dir(self.path())
    }

    pub fn write_config(&self, release_system: &str, version: &str) -> ReleaseConfig {
        let config = ReleaseConfig {
            project_owner: "acme".to_string(),
            project_name: "widget".to_string(),
            project_type: ProjectKind::Other,
            release_system: release_system.to_string(),
            version: version.to_string(),
        };
        self.store().save(&config).unwrap();
        config
    }
}
