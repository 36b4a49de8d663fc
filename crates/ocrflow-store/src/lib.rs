//! ocrflow Storage Layer
//!
//! Implements the `ArtifactStore` trait for uploaded documents and the
//! artifacts derived from them.
//!
//! # Stores
//!
//! - `FsArtifactStore`: one directory per namespace under a root directory
//! - `MemoryArtifactStore`: in-process map, for tests
//!
//! # Keys
//!
//! Keys are `/`-separated relative paths (`outputfiles/invoice_20260101_120000_result.json`).
//! Empty, absolute, or traversing keys are rejected before any I/O happens.
//!
//! # Examples
//!
//! ```no_run
//! use ocrflow_domain::ArtifactStore;
//! use ocrflow_store::FsArtifactStore;
//!
//! # async fn example() -> Result<(), ocrflow_store::StoreError> {
//! let store = FsArtifactStore::new("app");
//! store.ensure_namespace("outputfiles").await?;
//! store.write_text("outputfiles/invoice_extracted.txt", "Total: $42").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod fs;
mod memory;

pub use fs::FsArtifactStore;
pub use memory::MemoryArtifactStore;

/// Errors that can occur during storage operations
pub use ocrflow_domain::ArtifactError as StoreError;

/// Check that `key` is a relative path that stays inside the store
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    let invalid = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");

    if invalid {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}
