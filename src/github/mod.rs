//! Platform release management

mod release_manager;

pub use release_manager::{
    GITHUB_API, GitHubReleaseConfig, GitHubReleaseManager, NewRelease, PlatformReleases,
    PublishedRelease,
};
