//! # KODEGEN Release
//!
//! Release cuts with pluggable release backends.
//!
//! A host process sends one request to an out-of-process release handler
//! through the execution [`gateway`]. The handler runs the release
//! [`saga`]: preflight checks, the version guard, then a backend that
//! commits, tags, pushes and publishes. A failed step rolls back what was
//! already done.
//!
//! ## Usage
//!
//! ```bash
//! kodegen_release init -f project-type=other -f release-system=goreleaser
//! kodegen_release patch            # Cut a patch release
//! kodegen_release minor --dry-run  # Preview a minor release
//! kodegen_release history          # Tags with commit counts
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod backend;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod gateway;
pub mod git;
pub mod github;
pub mod guard;
pub mod handler;
pub mod preflight;
pub mod protocol;
pub mod saga;
pub mod state;
pub mod version;

// Re-export main types for public API
pub use backend::{BackendRegistry, ReleaseBackend};
pub use cli::Args;
pub use config::{ConfigStore, ReleaseConfig};
pub use error::{CliError, ReleaseError, Result};
pub use git::{GitCli, GitOperations};
pub use protocol::{ReleaseRequest, ReleaseResponse};
pub use saga::{ReleaseOutcome, ReleaseSaga};
pub use state::GitReleaseState;
pub use version::{VersionBump, VersionBumper};
