//! Error types for the Orchestrator

use ocrflow_domain::{ArtifactError, RemoteSubmissionError};
use thiserror::Error;

/// Errors that can end an extraction request
///
/// Highlight enrichment failures never appear here: they are recovered
/// inside the orchestrator.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The remote service rejected the document or could not be reached
    #[error("Submission error: {0}")]
    Submission(RemoteSubmissionError),

    /// Completion was not observed within the wait bound
    #[error("Extraction timed out after {secs}s")]
    Timeout {
        /// The configured wait bound
        secs: u64,
    },

    /// An artifact could not be written
    #[error("Persistence error: {0}")]
    Persistence(#[source] ArtifactError),

    /// The result could not be represented as JSON
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExtractorError {
    /// Stable snake_case tag for the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractorError::Submission(_) => "submission_error",
            ExtractorError::Timeout { .. } => "timeout_error",
            ExtractorError::Persistence(_) => "persistence_error",
            ExtractorError::Serialization(_) => "serialization_error",
            ExtractorError::Config(_) => "config_error",
        }
    }

    /// Whether the request ran out of time (a longer bound may succeed)
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExtractorError::Timeout { .. })
    }
}

impl From<RemoteSubmissionError> for ExtractorError {
    fn from(e: RemoteSubmissionError) -> Self {
        match e {
            RemoteSubmissionError::Timeout { secs } => ExtractorError::Timeout { secs },
            other => ExtractorError::Submission(other),
        }
    }
}

impl From<ArtifactError> for ExtractorError {
    fn from(e: ArtifactError) -> Self {
        if e.is_serialization() {
            ExtractorError::Serialization(e.to_string())
        } else {
            ExtractorError::Persistence(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_timeout_becomes_timeout() {
        let err = ExtractorError::from(RemoteSubmissionError::Timeout { secs: 7 });
        assert!(err.is_timeout());
        assert_eq!(err.kind(), "timeout_error");
        assert_eq!(err.to_string(), "Extraction timed out after 7s");
    }

    #[test]
    fn test_other_remote_failures_are_submission_errors() {
        let err = ExtractorError::from(RemoteSubmissionError::Unauthorized("bad key".into()));
        assert!(!err.is_timeout());
        assert_eq!(err.kind(), "submission_error");
    }

    #[test]
    fn test_artifact_failures() {
        let err = ExtractorError::from(ArtifactError::InvalidKey("..".into()));
        assert_eq!(err.kind(), "persistence_error");

        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ExtractorError::from(ArtifactError::Serialization {
            key: "out/a.json".into(),
            source,
        });
        assert_eq!(err.kind(), "serialization_error");
    }
}
