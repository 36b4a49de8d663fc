//! ocrflow Domain Layer
//!
//! Core data model and capability traits for the document extraction workflow.
//! Infrastructure (the remote OCR client, artifact persistence) lives in other
//! crates and plugs in through the traits defined here.
//!
//! ## Key Concepts
//!
//! - **UploadedDocument**: raw bytes plus the original filename of one upload
//! - **ExtractionJob**: one submission to the remote OCR service, identified by
//!   its whisper hash
//! - **ExtractionResult**: the normalized outcome (text, highlights, metadata)
//! - **Highlights**: optional positional metadata over the extracted lines
//!
//! ## Architecture
//!
//! ```text
//! Endpoint → Orchestrator → ExtractionClient (submit, highlights)
//!                         → ArtifactStore (input bytes, text, JSON)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod job;
pub mod options;
pub mod result;
pub mod traits;

// Re-exports for convenience
pub use document::UploadedDocument;
pub use error::{ArtifactError, RemoteEnrichmentError, RemoteSubmissionError};
pub use job::{ExtractionJob, RawExtractionResponse};
pub use options::{LineSelector, OutputMode, ProcessingMode, SubmissionParams};
pub use result::{ExtractionResponse, ExtractionResult, Highlights};
pub use traits::{artifact_key, ArtifactStore, ExtractionClient};
