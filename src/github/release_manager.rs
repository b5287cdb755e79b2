//! GitHub Release management over the REST API

use crate::config::env;
use crate::error::{PlatformError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use semver::Version;
use serde::{Deserialize, Serialize};

/// Default GitHub REST endpoint
pub const GITHUB_API: &str = "https://api.github.com";

/// Create and delete published releases on a hosting platform
#[async_trait]
pub trait PlatformReleases: Send + Sync {
    /// Fail early when credentials are missing
    fn ensure_ready(&self) -> Result<()> {
        Ok(())
    }

    /// Publish a release for an existing tag
    async fn create_release(&self, release: &NewRelease) -> Result<PublishedRelease>;

    /// Delete the release attached to `tag`.
    ///
    /// Returns `false` when no such release exists; that is not an error so
    /// rollback stays idempotent.
    async fn delete_release_by_tag(&self, tag: &str) -> Result<bool>;
}

/// Parameters of a release to publish
#[derive(Debug, Clone, Serialize)]
pub struct NewRelease {
    /// Existing tag the release points at
    pub tag_name: String,
    /// Display name
    pub name: String,
    /// Markdown body
    pub body: String,
    /// Whether to mark as pre-release
    pub prerelease: bool,
    /// Whether to keep the release as a draft
    pub draft: bool,
}

impl NewRelease {
    /// Release for `version` tagged `tag_name`; `0.x` and pre-release versions are marked pre-release
    pub fn for_version(version: &Version, tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            name: tag_name.to_string(),
            body: format!("Release version {}", version),
            prerelease: version.major == 0 || !version.pre.is_empty(),
            draft: false,
        }
    }
}

/// Result of GitHub release operation
#[derive(Debug, Clone, Deserialize)]
pub struct PublishedRelease {
    /// Release ID
    pub id: u64,
    /// Release URL
    #[serde(default)]
    pub html_url: String,
    /// Tag the release points at
    #[serde(default)]
    pub tag_name: String,
}

/// Configuration for GitHub releases
#[derive(Debug, Clone)]
pub struct GitHubReleaseConfig {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// API base URL
    pub api_base: String,
    /// Token; falls back to `GITHUB_TOKEN` when unset
    pub token: Option<String>,
}

impl GitHubReleaseConfig {
    /// Configuration for `owner/repo` on github.com
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            api_base: GITHUB_API.to_string(),
            token: None,
        }
    }
}

/// GitHub release manager
#[derive(Debug, Clone)]
pub struct GitHubReleaseManager {
    client: Client,
    config: GitHubReleaseConfig,
}

impl GitHubReleaseManager {
    /// Create new GitHub release manager
    pub fn new(config: GitHubReleaseConfig) -> Result<Self> {
        if config.owner.is_empty() || config.repo.is_empty() {
            return Err(PlatformError::UnknownRepository.into());
        }
        let client = Client::builder()
            .user_agent(concat!("kodegen-release/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PlatformError::Request {
                url: config.api_base.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self { client, config })
    }

    /// Repository this manager operates on, as `owner/repo`
    pub fn repository(&self) -> String {
        format!("{}/{}", self.config.owner, self.config.repo)
    }

    fn token(&self) -> Result<String> {
        match &self.config.token {
            Some(token) if !token.is_empty() => Ok(token.clone()),
            _ => Ok(env::github_token()?),
        }
    }

    fn releases_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases",
            self.config.api_base.trim_end_matches('/'),
            self.config.owner,
            self.config.repo
        )
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        Ok(request
            .bearer_auth(self.token()?)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28"))
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<reqwest::Response> {
        self.authorized(request)?.send().await.map_err(|e| {
            PlatformError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

async fn api_error(response: reqwest::Response, action: String) -> PlatformError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    PlatformError::Api {
        action,
        status,
        body,
    }
}

#[async_trait]
impl PlatformReleases for GitHubReleaseManager {
    fn ensure_ready(&self) -> Result<()> {
        self.token().map(drop)
    }

    async fn create_release(&self, release: &NewRelease) -> Result<PublishedRelease> {
        let url = self.releases_url();
        let response = self
            .send(self.client.post(&url).json(release), &url)
            .await?;

        if response.status() != StatusCode::CREATED {
            return Err(api_error(
                response,
                format!("creating release for tag {}", release.tag_name),
            )
            .await
            .into());
        }

        response.json::<PublishedRelease>().await.map_err(|e| {
            PlatformError::Request {
                url,
                reason: e.to_string(),
            }
            .into()
        })
    }

    async fn delete_release_by_tag(&self, tag: &str) -> Result<bool> {
        if tag.is_empty() {
            return Ok(false);
        }

        let lookup_url = format!("{}/tags/{}", self.releases_url(), tag);
        let response = self.send(self.client.get(&lookup_url), &lookup_url).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if response.status() != StatusCode::OK {
            return Err(api_error(response, format!("fetching release by tag {}", tag))
                .await
                .into());
        }

        let release = response
            .json::<PublishedRelease>()
            .await
            .map_err(|e| PlatformError::Request {
                url: lookup_url.clone(),
                reason: e.to_string(),
            })?;

        let delete_url = format!("{}/{}", self.releases_url(), release.id);
        let response = self
            .send(self.client.delete(&delete_url), &delete_url)
            .await?;
        if response.status() != StatusCode::NO_CONTENT {
            return Err(api_error(response, format!("deleting release for tag {}", tag))
                .await
                .into());
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prerelease_marking() {
        assert!(NewRelease::for_version(&Version::new(0, 4, 0), "v0.4.0").prerelease);
        assert!(!NewRelease::for_version(&Version::new(1, 0, 0), "v1.0.0").prerelease);
        let rc = Version::parse("2.0.0-rc.1").unwrap();
        assert!(NewRelease::for_version(&rc, "v2.0.0-rc.1").prerelease);
    }

    #[test]
    fn test_unknown_repository_rejected() {
        let err = GitHubReleaseManager::new(GitHubReleaseConfig::new("", "widget")).unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_REPOSITORY");
    }

    #[test]
    fn test_urls() {
        let mut config = GitHubReleaseConfig::new("acme", "widget");
        config.api_base = "http://localhost:9999/".to_string();
        let manager = GitHubReleaseManager::new(config).unwrap();
        assert_eq!(manager.releases_url(), "http://localhost:9999/repos/acme/widget/releases");
        assert_eq!(manager.repository(), "acme/widget");
    }
}
