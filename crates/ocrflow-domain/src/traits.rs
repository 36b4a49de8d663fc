//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the orchestration logic and
//! infrastructure. Implementations live in other crates and must be safe for
//! concurrent use by simultaneous requests.

use crate::{
    ArtifactError, Highlights, LineSelector, RawExtractionResponse, RemoteEnrichmentError,
    RemoteSubmissionError, SubmissionParams, UploadedDocument,
};
use async_trait::async_trait;
use serde::Serialize;

/// Capability interface over the remote OCR service
///
/// Implemented by the infrastructure layer (ocrflow-whisper)
#[async_trait]
pub trait ExtractionClient: Send + Sync {
    /// Submit a document for extraction
    ///
    /// With `params.wait_for_completion` set, the returned future resolves
    /// only once the remote job completes, fails, or `wait_timeout_secs`
    /// elapses (reported as [`RemoteSubmissionError::Timeout`]).
    async fn submit(
        &self,
        document: &UploadedDocument,
        params: &SubmissionParams,
    ) -> Result<RawExtractionResponse, RemoteSubmissionError>;

    /// Fetch highlight metadata for a completed job
    ///
    /// Failures are reported faithfully; deciding whether they matter is the
    /// caller's business.
    async fn fetch_highlights(
        &self,
        whisper_hash: &str,
        lines: LineSelector,
    ) -> Result<Highlights, RemoteEnrichmentError>;
}

/// Key-addressable persistence for uploads and derived artifacts
///
/// Keys are `/`-separated relative strings whose first segment is the
/// namespace (`inputfiles/invoice.pdf`). Writes never create namespaces;
/// [`ArtifactStore::ensure_namespace`] is a one-time bootstrap step.
///
/// Implemented by the infrastructure layer (ocrflow-store)
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Create a namespace if it does not exist yet
    async fn ensure_namespace(&self, namespace: &str) -> Result<(), ArtifactError>;

    /// Write raw bytes under `key`, replacing any previous artifact
    async fn write_binary(&self, key: &str, bytes: &[u8]) -> Result<(), ArtifactError>;

    /// Write UTF-8 text under `key`, replacing any previous artifact
    async fn write_text(&self, key: &str, content: &str) -> Result<(), ArtifactError> {
        self.write_binary(key, content.as_bytes()).await
    }

    /// Serialize `object` as pretty-printed JSON and write it under `key`
    async fn write_structured<T>(&self, key: &str, object: &T) -> Result<(), ArtifactError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let json = serde_json::to_string_pretty(object).map_err(|source| {
            ArtifactError::Serialization {
                key: key.to_string(),
                source,
            }
        })?;
        self.write_text(key, &json).await
    }
}

/// Join a namespace and a name into a store key
pub fn artifact_key(namespace: &str, name: &str) -> String {
    let namespace = namespace.trim_matches('/');
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", namespace, name)
    }
}
