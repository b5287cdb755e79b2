//! Name-keyed backend lookup, built explicitly at process start.

use super::{
    BackendContext, GitHubBackend, GoReleaserBackend, JReleaserBackend, ReleaseBackend,
    ReleaseItBackend,
};
use crate::error::{BackendError, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registered backends by name
#[derive(Default, Clone)]
pub struct BackendRegistry {
    backends: BTreeMap<&'static str, Arc<dyn ReleaseBackend>>,
}

impl BackendRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in backend sharing `ctx`
    pub fn with_defaults(ctx: Arc<BackendContext>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(GoReleaserBackend::new(ctx.clone())));
        registry.register(Arc::new(JReleaserBackend::new(ctx.clone())));
        registry.register(Arc::new(ReleaseItBackend::new(ctx.clone())));
        registry.register(Arc::new(GitHubBackend::new(ctx)));
        registry
    }

    /// Add a backend; a later registration under the same name replaces the earlier one
    pub fn register(&mut self, backend: Arc<dyn ReleaseBackend>) -> &mut Self {
        if self.backends.insert(backend.name(), backend).is_some() {
            log::debug!("replaced previously registered backend");
        }
        self
    }

    /// Look up a backend by name
    pub fn get(&self, name: &str) -> Result<Arc<dyn ReleaseBackend>> {
        self.backends.get(name).cloned().ok_or_else(|| {
            BackendError::NotFound {
                name: name.to_string(),
                available: self.names().join(", "),
            }
            .into()
        })
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        self.backends.keys().copied().collect()
    }

    /// Registered backends, sorted by name
    pub fn backends(&self) -> impl Iterator<Item = &Arc<dyn ReleaseBackend>> {
        self.backends.values()
    }
}
