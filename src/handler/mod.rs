//! Command routing inside the handler process.
//!
//! [`dispatch`] turns one decoded [`ReleaseRequest`] into exactly one
//! [`ReleaseResponse`]. Each command decodes its flags into a typed struct
//! first; a [`ReleaseError`] anywhere below becomes an error response
//! carrying the error's code.

mod history;
mod init;
mod manifest;
mod release;
mod validate;

pub use manifest::manifest;

use crate::backend::{BackendContext, BackendRegistry, SystemToolRunner, ToolRunner};
use crate::config::{ConfigStore, ReleaseConfig};
use crate::diagnostics::{CONFIG, EXEC};
use crate::error::ReleaseError;
use crate::git::{GitCli, GitConfig, GitOperations};
use crate::github::{GitHubReleaseConfig, GitHubReleaseManager, PlatformReleases};
use crate::guard::VersionGuard;
use crate::preflight::{DEFAULT_RELEASE_BRANCHES, Preflight};
use crate::protocol::{
    DataValue, ReleaseRequest, ReleaseResponse, ResponseError, ResponseMetadata, Row, Scalar,
};
use crate::saga::ReleaseSaga;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Name the handler reports in response metadata and its manifest
pub const HANDLER_NAME: &str = "release";

/// Collaborators a handler works with.
///
/// [`HandlerEnv::system`] wires the real git CLI, tool runner and GitHub
/// client; tests swap any of them out.
#[derive(Clone)]
pub struct HandlerEnv {
    work_dir: PathBuf,
    git: Arc<dyn GitOperations>,
    tools: Arc<dyn ToolRunner>,
    platform: Option<Arc<dyn PlatformReleases>>,
    git_config: GitConfig,
    release_branches: Vec<String>,
}

impl HandlerEnv {
    /// Environment backed by real processes and the GitHub API
    pub fn system(work_dir: impl Into<PathBuf>) -> Self {
        let work_dir = work_dir.into();
        Self {
            git: Arc::new(GitCli::new(&work_dir)),
            tools: Arc::new(SystemToolRunner),
            platform: None,
            git_config: GitConfig::default(),
            release_branches: DEFAULT_RELEASE_BRANCHES.iter().map(|b| b.to_string()).collect(),
            work_dir,
        }
    }

    /// Replace the git implementation
    pub fn with_git(mut self, git: Arc<dyn GitOperations>) -> Self {
        self.git = git;
        self
    }

    /// Replace the external tool runner
    pub fn with_tools(mut self, tools: Arc<dyn ToolRunner>) -> Self {
        self.tools = tools;
        self
    }

    /// Use `platform` instead of a GitHub client built from the configuration
    pub fn with_platform(mut self, platform: Arc<dyn PlatformReleases>) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Branches releases may be cut from
    pub fn with_release_branches(mut self, branches: Vec<String>) -> Self {
        self.release_branches = branches;
        self
    }

    /// Repository working directory
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Configuration file location
    pub fn store(&self) -> ConfigStore {
        ConfigStore::in_dir(&self.work_dir)
    }

    /// Names of every registered backend
    pub fn backend_names(&self) -> Vec<&'static str> {
        self.registry(None).names()
    }

    /// Registry of backends sharing this environment
    pub fn registry(&self, config: Option<&ReleaseConfig>) -> BackendRegistry {
        BackendRegistry::with_defaults(Arc::new(BackendContext {
            work_dir: self.work_dir.clone(),
            git: self.git.clone(),
            platform: self.platform_for(config),
            tools: self.tools.clone(),
            git_config: self.git_config.clone(),
        }))
    }

    fn saga<'a>(&self, registry: &'a BackendRegistry) -> ReleaseSaga<'a> {
        ReleaseSaga::new(
            Preflight::with_branches(self.git.clone(), self.release_branches.clone()),
            VersionGuard::new(self.git.clone()),
            registry,
            self.store(),
        )
    }

    fn platform_for(&self, config: Option<&ReleaseConfig>) -> Option<Arc<dyn PlatformReleases>> {
        if let Some(platform) = &self.platform {
            return Some(platform.clone());
        }
        let config = config?;
        let releases = GitHubReleaseConfig::new(config.project_owner.clone(), config.project_name.clone());
        match GitHubReleaseManager::new(releases) {
            Ok(manager) => Some(Arc::new(manager)),
            Err(e) => {
                log::debug!(target: CONFIG, "no platform client: {}", e);
                None
            }
        }
    }
}

/// Successful command result, stamped with metadata by [`dispatch`]
#[derive(Debug, Default)]
pub(crate) struct Reply {
    data: BTreeMap<String, DataValue>,
    hint: Option<&'static str>,
}

impl Reply {
    fn text() -> Self {
        Self {
            data: BTreeMap::new(),
            hint: Some("text"),
        }
    }

    fn table(rows: Vec<Row>) -> Self {
        Self {
            data: BTreeMap::new(),
            hint: Some("table"),
        }
        .with("items", rows)
    }

    fn with(mut self, key: &str, value: impl Into<DataValue>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    fn into_response(self, metadata: ResponseMetadata) -> ReleaseResponse {
        let response = ReleaseResponse::success(metadata, self.data);
        match self.hint {
            Some(hint) => response.with_hint(hint),
            None => response,
        }
    }
}

/// Build one table row
fn row<const N: usize>(fields: [(&str, Scalar); N]) -> Row {
    fields
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Route `request` to its command
pub async fn dispatch(env: &HandlerEnv, request: &ReleaseRequest) -> ReleaseResponse {
    let metadata = ResponseMetadata::new(HANDLER_NAME, request.command.clone());
    log::debug!(target: EXEC, "handling '{}'", request.command);

    let result: Result<Reply, ReleaseError> = match request.command.as_str() {
        "init" => init::init(env, request).await,
        "init-options" => Ok(init::options(env)),
        "patch" | "minor" | "major" | "release" => release::release(env, request).await,
        "validate" => validate::validate(env, request),
        "history" => history::history(env).await,
        "contributors" => history::contributors(env).await,
        "manifest" => Ok(manifest::describe(env)),
        other => {
            return ReleaseResponse::failure(metadata, unknown_command(other, env));
        }
    };

    match result {
        Ok(reply) => reply.into_response(metadata),
        Err(e) => {
            log::error!(target: EXEC, "{}", e);
            ReleaseResponse::from_error(metadata, &e)
        }
    }
}

fn unknown_command(command: &str, env: &HandlerEnv) -> ResponseError {
    let mut error = ResponseError::new("UNKNOWN_COMMAND", format!("unknown command: {}", command));
    let available = manifest(&env.backend_names())
        .commands
        .into_iter()
        .map(|c| c.name)
        .collect::<Vec<_>>();
    error.details.insert("available".to_string(), available.into());
    error
}
