//! Filesystem-backed artifact store

use crate::{validate_key, StoreError};
use async_trait::async_trait;
use ocrflow_domain::ArtifactStore;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Artifact store rooted at a directory
///
/// Each namespace is a subdirectory of the root. Writes replace existing
/// files and never create directories; call `ensure_namespace` once at
/// startup for every namespace in use.
///
/// # Thread Safety
///
/// The store holds only its root path; concurrent writes to distinct keys
/// are independent, and a collision on the same key is last-writer-wins.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    /// Create a store rooted at `root`
    ///
    /// The directory is not touched until the first `ensure_namespace`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path an artifact key resolves to
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(key
            .split('/')
            .fold(self.root.clone(), |path, segment| path.join(segment)))
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn ensure_namespace(&self, namespace: &str) -> Result<(), StoreError> {
        let path = self.path_for(namespace.trim_matches('/'))?;
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|source| StoreError::Write {
                key: namespace.to_string(),
                source,
            })?;
        debug!(namespace, path = %path.display(), "Namespace ready");
        Ok(())
    }

    async fn write_binary(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StoreError::Write {
                key: key.to_string(),
                source,
            })?;
        debug!(key, bytes = bytes.len(), "Artifact written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_for() {
        let store = FsArtifactStore::new("/srv/app");
        assert_eq!(
            store.path_for("inputfiles/a.pdf").unwrap(),
            Path::new("/srv/app").join("inputfiles").join("a.pdf")
        );
        assert!(store.path_for("../a.pdf").is_err());
    }
}
