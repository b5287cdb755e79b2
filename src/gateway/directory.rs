//! Discovery of installed handlers.
//!
//! Layout: `<root>/<name>/handler-<name>` with an optional
//! `<root>/<name>/manifest.json` describing it.

use crate::error::{Result, TransportError};
use crate::protocol::Manifest;
use std::path::{Path, PathBuf};

/// A directory holding one sub-directory per installed handler
#[derive(Debug, Clone)]
pub struct HandlerDirectory {
    root: PathBuf,
}

impl HandlerDirectory {
    /// Wrap a handler root directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the handler executable for `name`
    pub fn locate(&self, name: &str) -> Result<PathBuf> {
        let path = self.root.join(name).join(format!("handler-{}", name));
        if !path.is_file() {
            return Err(TransportError::HandlerNotFound {
                name: name.to_string(),
                path,
            }
            .into());
        }
        Ok(path)
    }

    /// Manifests of every installed handler, sorted by name.
    ///
    /// Entries without a readable, valid `manifest.json` are skipped.
    pub fn manifests(&self) -> Result<Vec<Manifest>> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut manifests = Vec::new();
        for entry in entries.flatten() {
            let manifest_path = entry.path().join("manifest.json");
            let Ok(content) = std::fs::read_to_string(&manifest_path) else {
                continue;
            };
            match serde_json::from_str::<Manifest>(&content) {
                Ok(manifest) => manifests.push(manifest),
                Err(e) => log::debug!("skipping {}: {}", manifest_path.display(), e),
            }
        }
        manifests.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(manifests)
    }
}
