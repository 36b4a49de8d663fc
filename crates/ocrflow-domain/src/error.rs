//! Typed failures reported across the capability traits

use thiserror::Error;

/// Failure of a submission to the remote OCR service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteSubmissionError {
    /// Network failure before a response was received
    #[error("OCR service unreachable: {0}")]
    Unreachable(String),

    /// The credential was missing or refused
    #[error("OCR service rejected the credential: {0}")]
    Unauthorized(String),

    /// The remote service refused the document or request
    #[error("OCR service rejected the request (HTTP {status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// The remote job ended in an error state
    #[error("OCR processing failed: {0}")]
    Processing(String),

    /// Completion was not observed within the wait bound
    #[error("OCR job did not complete within {secs}s")]
    Timeout {
        /// The configured wait bound
        secs: u64,
    },

    /// A response could not be decoded
    #[error("Invalid response from OCR service: {0}")]
    InvalidResponse(String),
}

impl RemoteSubmissionError {
    /// Whether the failure is an exceeded wait bound
    pub fn is_timeout(&self) -> bool {
        matches!(self, RemoteSubmissionError::Timeout { .. })
    }
}

/// Failure of the highlight enrichment call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteEnrichmentError {
    /// Network failure before a response was received
    #[error("Highlight request failed: {0}")]
    Unreachable(String),

    /// Non-success HTTP status
    #[error("Highlight request rejected (HTTP {status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// The body was not a highlight mapping
    #[error("Invalid highlight response: {0}")]
    InvalidResponse(String),

    /// Generic failure (test doubles, unexpected states)
    #[error("Highlight error: {0}")]
    Other(String),
}

/// Failure of an artifact store operation
#[derive(Error, Debug)]
pub enum ArtifactError {
    /// The key is empty, absolute, or escapes its namespace
    #[error("Invalid artifact key: {0:?}")]
    InvalidKey(String),

    /// I/O failure while writing (disk full, permission denied, missing namespace)
    #[error("Failed to write artifact {key}: {source}")]
    Write {
        /// Key being written
        key: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The object could not be represented as JSON
    #[error("Failed to serialize artifact {key}: {source}")]
    Serialization {
        /// Key being written
        key: String,
        /// Underlying serialization error
        #[source]
        source: serde_json::Error,
    },
}

impl ArtifactError {
    /// Whether the failure is a serialization failure rather than an I/O failure
    pub fn is_serialization(&self) -> bool {
        matches!(self, ArtifactError::Serialization { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_distinguishable() {
        assert!(RemoteSubmissionError::Timeout { secs: 1 }.is_timeout());
        assert!(!RemoteSubmissionError::Processing("bad scan".into()).is_timeout());
    }

    #[test]
    fn test_error_messages() {
        let err = RemoteSubmissionError::Rejected {
            status: 400,
            message: "unsupported file".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "OCR service rejected the request (HTTP 400): unsupported file"
        );

        let err = ArtifactError::InvalidKey("../x".to_string());
        assert_eq!(err.to_string(), "Invalid artifact key: \"../x\"");
    }

    #[test]
    fn test_serialization_flag() {
        let io = ArtifactError::Write {
            key: "a".to_string(),
            source: std::io::Error::other("disk full"),
        };
        assert!(!io.is_serialization());
    }
}
