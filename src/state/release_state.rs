//! Side effects completed during one release attempt.

use std::sync::Mutex;

/// What a backend has done so far; the only input to rollback.
///
/// Zero-valued at saga start. Fields are only ever set, never cleared, while
/// a release runs. Lives in memory only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitReleaseState {
    /// HEAD before the release commit
    pub pre_release_head: Option<String>,
    /// Hash of the release commit
    pub release_commit: Option<String>,
    /// Tag created for the release
    pub tag_name: Option<String>,
    /// Tag the platform release is attached to, usually `tag_name`
    pub platform_release_tag: Option<String>,
    /// Release commit was pushed
    pub pushed_commit: bool,
    /// Tag was pushed
    pub pushed_tag: bool,
    /// A platform release was published
    pub created_platform_release: bool,
}

impl GitReleaseState {
    /// Whether nothing has happened yet
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Shared, mutable holder of a backend's [`GitReleaseState`]
#[derive(Debug, Default)]
pub struct ReleaseStateTracker {
    state: Mutex<GitReleaseState>,
}

impl ReleaseStateTracker {
    /// Empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one monotonic update
    pub fn record<F>(&self, update: F)
    where
        F: FnOnce(&mut GitReleaseState),
    {
        // A panic while holding the lock leaves the state as recorded so far
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        update(&mut state);
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> GitReleaseState {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Discard everything recorded
    pub fn reset(&self) {
        self.record(|state| *state = GitReleaseState::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_snapshot_reset() {
        let tracker = ReleaseStateTracker::new();
        assert!(tracker.snapshot().is_empty());

        tracker.record(|s| s.tag_name = Some("v1.0.0".to_string()));
        tracker.record(|s| s.pushed_tag = true);
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.tag_name.as_deref(), Some("v1.0.0"));
        assert!(snapshot.pushed_tag);

        tracker.reset();
        assert!(tracker.snapshot().is_empty());
    }
}
