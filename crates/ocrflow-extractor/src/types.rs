//! Outcome types for extraction

use crate::naming;
use ocrflow_domain::ExtractionResult;
use serde::{Deserialize, Serialize};

/// Keys of the artifacts persisted for one result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedArtifactSet {
    /// Raw upload
    pub input_key: String,

    /// Plain extracted text (`{base}_{timestamp}_extracted.txt`)
    pub text_key: String,

    /// Full result object (`{base}_{timestamp}_result.json`)
    pub json_key: String,
}

impl PersistedArtifactSet {
    /// Derive the output keys for a result
    pub fn new(
        input_key: String,
        output_namespace: &str,
        base_name: &str,
        processed_at: &str,
    ) -> Self {
        let prefix = naming::output_prefix(base_name, processed_at);
        Self {
            input_key,
            text_key: naming::text_key(output_namespace, &prefix),
            json_key: naming::json_key(output_namespace, &prefix),
        }
    }
}

/// What happened to the highlight enrichment step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EnrichmentStatus {
    /// Highlights were fetched
    Fetched,

    /// No job handle, so nothing was requested
    Skipped,

    /// The request failed; highlights were replaced with an empty mapping
    Failed {
        /// Why the request failed
        reason: String,
    },
}

/// Successful outcome of one extraction request
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutcome {
    /// The normalized result
    pub result: ExtractionResult,

    /// Where the result was persisted
    pub artifacts: PersistedArtifactSet,

    /// Outcome of the best-effort enrichment
    pub enrichment: EnrichmentStatus,
}
