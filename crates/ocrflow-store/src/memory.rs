//! In-memory artifact store for tests

use crate::{validate_key, StoreError};
use async_trait::async_trait;
use ocrflow_domain::ArtifactStore;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct MemoryState {
    artifacts: BTreeMap<String, Vec<u8>>,
    namespaces: BTreeSet<String>,
    failing_prefixes: Vec<String>,
}

/// Artifact store that keeps everything in a shared map
///
/// Clones share the same contents, so a test can keep one handle for
/// inspection while the orchestrator owns another.
///
/// # Examples
///
/// ```
/// use ocrflow_domain::ArtifactStore;
/// use ocrflow_store::MemoryArtifactStore;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let store = MemoryArtifactStore::new();
/// store.write_text("outputfiles/a.txt", "hello").await.unwrap();
/// assert_eq!(store.read_text("outputfiles/a.txt").as_deref(), Some("hello"));
///
/// store.fail_writes_under("outputfiles/");
/// assert!(store.write_text("outputfiles/b.txt", "x").await.is_err());
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryArtifactStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryArtifactStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every later write to a key starting with `prefix` fail
    pub fn fail_writes_under(&self, prefix: impl Into<String>) {
        self.state().failing_prefixes.push(prefix.into());
    }

    /// Raw bytes stored under `key`
    pub fn read(&self, key: &str) -> Option<Vec<u8>> {
        self.state().artifacts.get(key).cloned()
    }

    /// Content stored under `key`, decoded as UTF-8
    pub fn read_text(&self, key: &str) -> Option<String> {
        self.read(key).and_then(|bytes| String::from_utf8(bytes).ok())
    }

    /// All keys, sorted
    pub fn keys(&self) -> Vec<String> {
        self.state().artifacts.keys().cloned().collect()
    }

    /// Keys starting with `prefix`, sorted
    pub fn keys_under(&self, prefix: &str) -> Vec<String> {
        self.state()
            .artifacts
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Namespaces created through `ensure_namespace`
    pub fn namespaces(&self) -> Vec<String> {
        self.state().namespaces.iter().cloned().collect()
    }

    /// Number of stored artifacts
    pub fn len(&self) -> usize {
        self.state().artifacts.len()
    }

    /// Whether nothing has been stored
    pub fn is_empty(&self) -> bool {
        self.state().artifacts.is_empty()
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn ensure_namespace(&self, namespace: &str) -> Result<(), StoreError> {
        let namespace = namespace.trim_matches('/');
        validate_key(namespace)?;
        self.state().namespaces.insert(namespace.to_string());
        Ok(())
    }

    async fn write_binary(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        validate_key(key)?;

        let mut state = self.state();
        if state
            .failing_prefixes
            .iter()
            .any(|prefix| key.starts_with(prefix.as_str()))
        {
            return Err(StoreError::Write {
                key: key.to_string(),
                source: std::io::Error::other("simulated write failure"),
            });
        }

        state.artifacts.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}
