//! Environment variables read by the release tooling.

use crate::error::PlatformError;

/// Personal access token for the GitHub API
pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";

/// Token variable understood by jreleaser
pub const JRELEASER_GITHUB_TOKEN: &str = "JRELEASER_GITHUB_TOKEN";

/// Read the GitHub token; empty values count as missing
pub fn github_token() -> std::result::Result<String, PlatformError> {
    std::env::var(GITHUB_TOKEN)
        .ok()
        .filter(|token| !token.trim().is_empty())
        .ok_or(PlatformError::MissingToken { var: GITHUB_TOKEN })
}
