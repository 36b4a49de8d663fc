//! ocrflow Extractor
//!
//! Orchestrates the extraction of one uploaded document through the remote
//! OCR service.
//!
//! # Overview
//!
//! The Orchestrator persists the upload, submits it to the extraction
//! client, waits for completion within a bounded time, enriches the result
//! with highlight metadata on a best-effort basis, and persists the text and
//! the full JSON result next to the original.
//!
//! # Architecture
//!
//! ```text
//! UploadedDocument → Orchestrator → ExtractionClient (submit, highlights)
//!                                 → ArtifactStore (input, text, JSON)
//!                                 → ExtractionResult
//! ```
//!
//! # Failure Policy
//!
//! - Submission failure or timeout: fatal, no result artifacts are written
//! - Highlight enrichment failure: recovered, highlights become `{}`
//! - Artifact write failure: fatal
//! - A single submission and a single enrichment attempt; no retries
//!
//! # Example Usage
//!
//! ```no_run
//! use ocrflow_domain::UploadedDocument;
//! use ocrflow_extractor::{ExtractionConfig, Orchestrator};
//! use ocrflow_store::MemoryArtifactStore;
//! use ocrflow_whisper::MockExtractionClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MockExtractionClient::new("Total: $42");
//! let store = MemoryArtifactStore::new();
//! let orchestrator = Orchestrator::new(client, store, ExtractionConfig::default());
//!
//! let document = UploadedDocument::new("invoice.pdf", std::fs::read("invoice.pdf")?);
//! let outcome = orchestrator.process(document).await?;
//!
//! println!("Text: {}", outcome.result.text);
//! println!("Saved as: {}", outcome.artifacts.json_key);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod naming;
mod orchestrator;
mod types;

#[cfg(test)]
mod tests;

pub use config::ExtractionConfig;
pub use error::ExtractorError;
pub use naming::{timestamp, TIMESTAMP_FORMAT};
pub use orchestrator::Orchestrator;
pub use types::{EnrichmentStatus, PersistedArtifactSet, ProcessOutcome};
