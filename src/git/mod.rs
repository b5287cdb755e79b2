//! Git primitives for release cuts.
//!
//! Everything the guard, the preflight checks, the backends and the
//! rollback coordinator do to a repository goes through [`GitOperations`].

mod config;
mod git_adapter;
mod operations;
mod remote;

pub use config::GitConfig;
pub use git_adapter::GitCli;
pub use operations::{Contributor, GitOperations, parse_shortlog};
pub use remote::{RepoSlug, detect_repository, parse_github_remote};
