//! ocrflow Extraction Client Layer
//!
//! Implementations of the `ExtractionClient` trait from `ocrflow-domain`.
//!
//! # Clients
//!
//! - `MockExtractionClient`: Deterministic mock for testing
//! - `WhisperClient`: LLMWhisperer v2 API integration
//!
//! # Examples
//!
//! ```
//! use ocrflow_domain::{ExtractionClient, SubmissionParams, UploadedDocument};
//! use ocrflow_whisper::MockExtractionClient;
//!
//! # tokio_test_block(async {
//! let client = MockExtractionClient::new("Total: $42").with_whisper_hash("abc123");
//! let document = UploadedDocument::new("invoice.pdf", b"%PDF".to_vec());
//! let response = client.submit(&document, &SubmissionParams::default()).await.unwrap();
//! assert_eq!(response.result_text(), Some("Total: $42"));
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

#![warn(missing_docs)]

pub mod llmwhisperer;

use async_trait::async_trait;
use ocrflow_domain::{
    ExtractionClient, Highlights, LineSelector, RawExtractionResponse, RemoteEnrichmentError,
    RemoteSubmissionError, SubmissionParams, UploadedDocument,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use llmwhisperer::WhisperClient;

/// Errors that can occur while constructing a client
#[derive(Error, Debug)]
pub enum ClientError {
    /// Missing or invalid configuration (credential, base URL)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(String),
}

/// Where the mock's extracted text comes from
#[derive(Debug, Clone)]
enum MockText {
    Fixed(String),
    Echo,
}

/// Mock extraction client for deterministic testing
///
/// This client returns pre-configured responses without making any network
/// calls. Clones share their call counters.
///
/// # Examples
///
/// ```
/// use ocrflow_domain::RemoteEnrichmentError;
/// use ocrflow_whisper::MockExtractionClient;
///
/// // Fixed text, highlight enrichment failing
/// let client = MockExtractionClient::new("Total: $42")
///     .with_whisper_hash("abc123")
///     .fail_highlights(RemoteEnrichmentError::Other("boom".into()));
/// assert_eq!(client.submit_calls(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockExtractionClient {
    text: MockText,
    whisper_hash: Option<String>,
    extraction: Option<Value>,
    highlights: Highlights,
    submit_error: Option<RemoteSubmissionError>,
    highlight_error: Option<RemoteEnrichmentError>,
    submit_delay: Duration,
    submit_calls: Arc<AtomicUsize>,
    highlight_calls: Arc<AtomicUsize>,
}

impl MockExtractionClient {
    /// Create a mock returning the same text for every document
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_text(MockText::Fixed(text.into()))
    }

    /// Create a mock whose extracted text is the document content (UTF-8, lossy)
    pub fn echo() -> Self {
        Self::with_text(MockText::Echo)
    }

    fn with_text(text: MockText) -> Self {
        Self {
            text,
            whisper_hash: Some("mock-whisper-hash".to_string()),
            extraction: None,
            highlights: Highlights::new(),
            submit_error: None,
            highlight_error: None,
            submit_delay: Duration::ZERO,
            submit_calls: Arc::new(AtomicUsize::new(0)),
            highlight_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set the job handle reported by submissions
    pub fn with_whisper_hash(mut self, hash: impl Into<String>) -> Self {
        self.whisper_hash = Some(hash.into());
        self
    }

    /// Report no job handle at all
    pub fn without_whisper_hash(mut self) -> Self {
        self.whisper_hash = None;
        self
    }

    /// Replace the extraction payload verbatim (for malformed-payload tests)
    pub fn with_extraction(mut self, extraction: Value) -> Self {
        self.extraction = Some(extraction);
        self
    }

    /// Set the highlight mapping returned by enrichment
    pub fn with_highlights(mut self, highlights: Highlights) -> Self {
        self.highlights = highlights;
        self
    }

    /// Make every submission fail with `error`
    pub fn fail_submission(mut self, error: RemoteSubmissionError) -> Self {
        self.submit_error = Some(error);
        self
    }

    /// Make every highlight request fail with `error`
    pub fn fail_highlights(mut self, error: RemoteEnrichmentError) -> Self {
        self.highlight_error = Some(error);
        self
    }

    /// Delay every submission, ignoring the requested wait bound
    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    /// Number of `submit` calls so far
    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch_highlights` calls so far
    pub fn highlight_calls(&self) -> usize {
        self.highlight_calls.load(Ordering::SeqCst)
    }

    /// Reset both call counters
    pub fn reset_call_counts(&self) {
        self.submit_calls.store(0, Ordering::SeqCst);
        self.highlight_calls.store(0, Ordering::SeqCst);
    }
}

impl Default for MockExtractionClient {
    fn default() -> Self {
        Self::new("Default mock text")
    }
}

#[async_trait]
impl ExtractionClient for MockExtractionClient {
    async fn submit(
        &self,
        document: &UploadedDocument,
        _params: &SubmissionParams,
    ) -> Result<RawExtractionResponse, RemoteSubmissionError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);

        if !self.submit_delay.is_zero() {
            tokio::time::sleep(self.submit_delay).await;
        }

        if let Some(error) = &self.submit_error {
            return Err(error.clone());
        }

        let extraction = match (&self.extraction, &self.text) {
            (Some(extraction), _) => extraction.clone(),
            (None, MockText::Fixed(text)) => json!({ "result_text": text }),
            (None, MockText::Echo) => {
                json!({ "result_text": String::from_utf8_lossy(document.content()) })
            }
        };

        Ok(RawExtractionResponse {
            whisper_hash: self.whisper_hash.clone(),
            status: "processed".to_string(),
            extraction,
        })
    }

    async fn fetch_highlights(
        &self,
        _whisper_hash: &str,
        _lines: LineSelector,
    ) -> Result<Highlights, RemoteEnrichmentError> {
        self.highlight_calls.fetch_add(1, Ordering::SeqCst);

        match &self.highlight_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.highlights.clone()),
        }
    }
}
