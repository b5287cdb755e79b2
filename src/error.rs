//! Error types for release operations.
//!
//! Every error carries a short machine-readable code (see [`ReleaseError::code`])
//! that is forwarded verbatim into the handler's response object, plus a
//! human-readable message and optional recovery suggestions.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Gateway/transport errors (malformed or missing handler response)
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Release-readiness check failures
    #[error("Preflight check failed: {0}")]
    Preflight(#[from] PreflightError),

    /// Version parsing and guard errors
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// Persisted configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Git command errors
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    /// Platform (GitHub) API errors
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Release backend errors
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// A side-effecting release step failed
    #[error("release failed: {0}")]
    Execution(#[source] Box<ReleaseError>),

    /// A single compensation step failed while undoing a release
    #[error("rollback: failed to {action}: {source}")]
    Rollback {
        /// Compensation that failed
        action: String,
        /// Underlying failure
        #[source]
        source: Box<ReleaseError>,
    },

    /// Rolling back after a failed release failed as well
    #[error("{original}: failed undoing changes: {rollback}")]
    RollbackFailed {
        /// The release failure that triggered the rollback
        original: Box<ReleaseError>,
        /// The failure raised while rolling back
        rollback: Box<ReleaseError>,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the execution gateway while talking to a handler process
#[derive(Error, Debug)]
pub enum TransportError {
    /// Handler executable does not exist
    #[error("handler '{name}' not found at {path}")]
    HandlerNotFound {
        /// Handler name
        name: String,
        /// Path that was probed
        path: PathBuf,
    },

    /// Handler process could not be started
    #[error("failed to launch handler {path}: {reason}")]
    Spawn {
        /// Handler executable
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Handler exited successfully but its output was not a response object
    #[error("failed to parse handler response: {reason}\nOutput: {output}")]
    MalformedResponse {
        /// Parser message
        reason: String,
        /// Raw primary stream
        output: String,
    },

    /// Handler exited with a failure status and no parseable response
    #[error("handler execution failed (exit status {status})\nStderr: {stderr}")]
    HandlerFailed {
        /// Exit status, or "signal" when killed
        status: String,
        /// Raw diagnostic stream
        stderr: String,
    },
}

/// Release-readiness predicate failures
#[derive(Error, Debug)]
pub enum PreflightError {
    /// Working tree has uncommitted changes
    #[error("the working tree has uncommitted changes. Please commit or stash them")]
    UncommittedChanges,

    /// HEAD is not attached to a branch
    #[error("detached HEAD state detected. Please checkout a branch")]
    DetachedHead,

    /// Current branch is not a release branch
    #[error("you are on branch '{branch}'. Releases are only allowed from {allowed}")]
    IncorrectBranch {
        /// Current branch
        branch: String,
        /// Allowed branches, formatted for display
        allowed: String,
    },

    /// Current branch has no upstream configured
    #[error("branch '{branch}' has no upstream configured")]
    NoUpstream {
        /// Current branch
        branch: String,
    },

    /// Current branch is behind its upstream
    #[error("branch '{branch}' is behind its upstream. Please pull the latest changes")]
    BranchOutOfDate {
        /// Current branch
        branch: String,
    },

    /// Repository state could not be inspected
    #[error("unable to {check}: {reason}")]
    Inspect {
        /// What was being checked
        check: &'static str,
        /// Reason for the error
        reason: String,
    },
}

/// Version management errors
#[derive(Error, Debug)]
pub enum VersionError {
    /// Recorded version is not a semantic version
    #[error("version {version} in the release configuration is not a valid semantic version: {source}")]
    InvalidVersion {
        /// Version string
        version: String,
        /// Parsing error
        #[source]
        source: semver::Error,
    },

    /// Local version is behind the latest published tag
    #[error("version violation: local version {local} is smaller than latest tag {remote}")]
    Violation {
        /// Locally recorded version
        local: String,
        /// Latest published tag
        remote: String,
    },

    /// No release type given in a non-interactive context
    #[error("no release type given. Pass one of: major, minor, patch")]
    MissingReleaseType,

    /// Unknown release type
    #[error("invalid release type '{input}'. Valid options: major, minor, patch")]
    InvalidReleaseType {
        /// Offending input
        input: String,
    },

    /// Next version does not fit in a version component
    #[error("cannot apply a {bump} release to {current}: version component overflow")]
    Overflow {
        /// Version being bumped
        current: String,
        /// Requested release type
        bump: String,
    },
}

/// Persisted configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file missing
    #[error("no {} configuration found. Run 'init' first", path.display())]
    NotFound {
        /// Expected location
        path: PathBuf,
    },

    /// Configuration file exists and overwriting was not requested
    #[error("{} already exists. Use --force to overwrite", path.display())]
    AlreadyExists {
        /// Existing file
        path: PathBuf,
    },

    /// Configuration file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File path
        path: PathBuf,
        /// IO error
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid JSON for the schema
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// File path
        path: PathBuf,
        /// Parsing error
        #[source]
        source: serde_json::Error,
    },

    /// Configuration parsed but violates an invariant
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Reason for the error
        reason: String,
    },

    /// Configuration could not be written
    #[error("failed to write {}: {reason}", path.display())]
    Write {
        /// File path
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },
}

/// Git operation errors
#[derive(Error, Debug)]
pub enum GitError {
    /// The git executable could not be launched
    #[error("failed to launch `{command}`: {source}")]
    Spawn {
        /// Command line
        command: String,
        /// IO error
        #[source]
        source: std::io::Error,
    },

    /// A git command exited unsuccessfully
    #[error("`{command}` failed: {stderr}")]
    CommandFailed {
        /// Command line
        command: String,
        /// Captured diagnostic output
        stderr: String,
    },

    /// Git printed something we could not interpret
    #[error("unexpected output from `{command}`: {output}")]
    UnexpectedOutput {
        /// Command line
        command: String,
        /// Raw output
        output: String,
    },

    /// Remote URL does not point at a supported hosting platform
    #[error("could not parse GitHub repository information from remote '{url}'. Only GitHub repositories are supported")]
    UnsupportedRemote {
        /// Remote URL
        url: String,
    },
}

/// Platform release API errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Personal access token missing from the environment
    #[error("a GitHub personal access token ({var}) is required. Set it with: export {var}=your_token_here")]
    MissingToken {
        /// Environment variable name
        var: &'static str,
    },

    /// Owner/repository unknown
    #[error("repository owner and name are required for platform releases")]
    UnknownRepository,

    /// HTTP request could not be completed
    #[error("request to {url} failed: {reason}")]
    Request {
        /// Request URL
        url: String,
        /// Reason for the error
        reason: String,
    },

    /// API answered with an unexpected status
    #[error("failed {action}: status={status} body={body}")]
    Api {
        /// What was attempted
        action: String,
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },
}

/// Release backend errors
#[derive(Error, Debug)]
pub enum BackendError {
    /// Requested backend is not registered
    #[error("release system '{name}' not found (available: {available})")]
    NotFound {
        /// Requested name
        name: String,
        /// Registered names, formatted for display
        available: String,
    },

    /// Prerequisite binary is not installed
    #[error("required dependency missing: {binary}")]
    MissingDependency {
        /// Binary name
        binary: String,
    },

    /// External release tool failed
    #[error("{tool} failed: {output}")]
    ToolFailed {
        /// Tool invocation
        tool: String,
        /// Captured output
        output: String,
    },

    /// Backend-specific configuration could not be generated
    #[error("failed to initialize {backend}: {reason}")]
    InitFailed {
        /// Backend name
        backend: String,
        /// Reason for the error
        reason: String,
    },

    /// Recorded release state cannot be compensated
    #[error("inconsistent state: {reason}")]
    InconsistentState {
        /// Reason for the error
        reason: String,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments or request flags
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Missing required argument
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },
}

impl ReleaseError {
    /// Machine-readable error code forwarded in response objects
    pub fn code(&self) -> &'static str {
        match self {
            ReleaseError::Transport(e) => match e {
                TransportError::HandlerNotFound { .. } => "HANDLER_NOT_FOUND",
                TransportError::Spawn { .. } => "HANDLER_SPAWN_FAILED",
                TransportError::MalformedResponse { .. } => "MALFORMED_RESPONSE",
                TransportError::HandlerFailed { .. } => "HANDLER_FAILED",
            },
            ReleaseError::Preflight(e) => match e {
                PreflightError::UncommittedChanges => "UNCOMMITTED_CHANGES",
                PreflightError::DetachedHead => "DETACHED_HEAD",
                PreflightError::IncorrectBranch { .. } => "INCORRECT_BRANCH",
                PreflightError::NoUpstream { .. } => "NO_UPSTREAM_BRANCH",
                PreflightError::BranchOutOfDate { .. } => "BRANCH_OUT_OF_DATE",
                PreflightError::Inspect { .. } => "PREFLIGHT_INSPECTION_FAILED",
            },
            ReleaseError::Version(e) => match e {
                VersionError::InvalidVersion { .. } => "INVALID_VERSION",
                VersionError::Violation { .. } => "VERSION_VIOLATION",
                VersionError::MissingReleaseType => "MISSING_RELEASE_TYPE",
                VersionError::InvalidReleaseType { .. } => "INVALID_RELEASE_TYPE",
                VersionError::Overflow { .. } => "VERSION_OVERFLOW",
            },
            ReleaseError::Config(e) => match e {
                ConfigError::NotFound { .. } => "CONFIG_NOT_FOUND",
                ConfigError::AlreadyExists { .. } => "CONFIG_EXISTS",
                ConfigError::Read { .. } => "CONFIG_READ_ERROR",
                ConfigError::Parse { .. } | ConfigError::Invalid { .. } => "CONFIG_INVALID",
                ConfigError::Write { .. } => "SAVE_ERROR",
            },
            ReleaseError::Git(_) => "GIT_COMMAND_FAILED",
            ReleaseError::Platform(e) => match e {
                PlatformError::MissingToken { .. } => "MISSING_TOKEN",
                PlatformError::UnknownRepository => "UNKNOWN_REPOSITORY",
                PlatformError::Request { .. } | PlatformError::Api { .. } => "PLATFORM_API_ERROR",
            },
            ReleaseError::Backend(e) => match e {
                BackendError::NotFound { .. } => "RELEASE_SYSTEM_NOT_FOUND",
                BackendError::MissingDependency { .. } => "MISSING_DEPENDENCY",
                BackendError::ToolFailed { .. } => "TOOL_FAILED",
                BackendError::InitFailed { .. } => "BACKEND_INIT_FAILED",
                BackendError::InconsistentState { .. } => "INCONSISTENT_STATE",
            },
            ReleaseError::Cli(e) => match e {
                CliError::InvalidArguments { .. } => "INVALID_FLAGS",
                CliError::MissingArgument { .. } => "MISSING_ARGUMENT",
            },
            ReleaseError::Execution(_) => "RELEASE_FAILED",
            ReleaseError::Rollback { .. } => "ROLLBACK_STEP_FAILED",
            ReleaseError::RollbackFailed { .. } => "ROLLBACK_FAILED",
            ReleaseError::Io(_) => "IO_ERROR",
            ReleaseError::Json(_) => "JSON_ERROR",
        }
    }

    /// Whether this error was raised before any side effect was attempted
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ReleaseError::Preflight(_)
                | ReleaseError::Version(_)
                | ReleaseError::Config(_)
                | ReleaseError::Backend(BackendError::NotFound { .. })
        )
    }

    /// Whether this error came from the gateway rather than the handler
    pub fn is_transport(&self) -> bool {
        matches!(self, ReleaseError::Transport(_))
    }

    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Preflight(PreflightError::UncommittedChanges) => vec![
                "Commit pending changes: git add . && git commit -m 'message'".to_string(),
                "Stash changes temporarily: git stash".to_string(),
            ],
            ReleaseError::Preflight(PreflightError::DetachedHead) => {
                vec!["Checkout a release branch: git checkout main".to_string()]
            }
            ReleaseError::Preflight(PreflightError::NoUpstream { branch }) => vec![format!(
                "Set an upstream: git push --set-upstream origin {}",
                branch
            )],
            ReleaseError::Preflight(PreflightError::BranchOutOfDate { .. }) => {
                vec!["Pull the latest changes: git pull --rebase".to_string()]
            }
            ReleaseError::Version(VersionError::Violation { remote, .. }) => vec![
                format!(
                    "Update the version in the release configuration to at least {}",
                    remote
                ),
                "Check whether a release was tagged outside of this tool".to_string(),
            ],
            ReleaseError::Config(ConfigError::NotFound { .. }) => vec![
                "Run 'init' first to initialize the release configuration".to_string(),
            ],
            ReleaseError::Platform(PlatformError::MissingToken { var }) => {
                vec![format!("export {}=your_token_here", var)]
            }
            ReleaseError::Backend(BackendError::MissingDependency { binary }) => {
                vec![format!("Install '{}' and make sure it is on PATH", binary)]
            }
            ReleaseError::RollbackFailed { .. } => vec![
                "Inspect the repository with 'git status' and 'git log'".to_string(),
                "Delete leftover tags and platform releases manually".to_string(),
            ],
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rollback_failure_keeps_both_messages() {
        let original = ReleaseError::Execution(Box::new(
            BackendError::ToolFailed {
                tool: "goreleaser release --clean".to_string(),
                output: "boom".to_string(),
            }
            .into(),
        ));
        let rollback = ReleaseError::Rollback {
            action: "delete remote tag v1.0.0".to_string(),
            source: Box::new(
                GitError::CommandFailed {
                    command: "git push origin --delete v1.0.0".to_string(),
                    stderr: "denied".to_string(),
                }
                .into(),
            ),
        };
        let err = ReleaseError::RollbackFailed {
            original: Box::new(original),
            rollback: Box::new(rollback),
        };

        let message = err.to_string();
        assert!(message.contains("boom"));
        assert!(message.contains("denied"));
        assert_eq!(err.code(), "ROLLBACK_FAILED");
    }

    #[test]
    fn test_precondition_classification() {
        assert!(ReleaseError::from(PreflightError::DetachedHead).is_precondition());
        assert!(
            ReleaseError::from(VersionError::Violation {
                local: "1.0.0".to_string(),
                remote: "1.1.0".to_string(),
            })
            .is_precondition()
        );
        assert!(!ReleaseError::Execution(Box::new(PreflightError::DetachedHead.into()))
            .is_precondition());
    }
}
