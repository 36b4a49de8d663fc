//! Extraction jobs and the raw responses of the remote service

use crate::options::SubmissionParams;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One submission to the remote OCR service
///
/// The job is terminal once the remote service reports completion or the
/// wait times out; it is never resubmitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionJob {
    /// Opaque job handle ("whisper hash"), if the remote service issued one
    pub whisper_hash: Option<String>,

    /// Parameters the job was submitted with
    pub params: SubmissionParams,
}

impl ExtractionJob {
    /// Create a job record from a submission response
    pub fn new(whisper_hash: Option<String>, params: SubmissionParams) -> Self {
        // An empty token is as good as none
        let whisper_hash = whisper_hash.filter(|hash| !hash.trim().is_empty());
        Self {
            whisper_hash,
            params,
        }
    }

    /// The handle usable for follow-up requests such as highlights
    pub fn handle(&self) -> Option<&str> {
        self.whisper_hash.as_deref()
    }
}

/// Response of a submission, as reported by the extraction client
///
/// The extraction payload is kept untyped; the orchestrator decides how to
/// read it (a missing or malformed payload is a valid, reportable outcome).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawExtractionResponse {
    /// Job handle issued by the remote service
    #[serde(default)]
    pub whisper_hash: Option<String>,

    /// Last job status reported by the remote service
    #[serde(default)]
    pub status: String,

    /// Retrieved extraction payload (`result_text`, metadata, ...)
    #[serde(default)]
    pub extraction: Value,
}

impl RawExtractionResponse {
    /// The `result_text` field of the extraction payload, if present and a string
    pub fn result_text(&self) -> Option<&str> {
        self.extraction.get("result_text").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_discards_blank_handles() {
        let job = ExtractionJob::new(Some("  ".to_string()), SubmissionParams::default());
        assert_eq!(job.handle(), None);

        let job = ExtractionJob::new(Some("abc123".to_string()), SubmissionParams::default());
        assert_eq!(job.handle(), Some("abc123"));
    }

    #[test]
    fn test_result_text_lookup() {
        let response = RawExtractionResponse {
            whisper_hash: Some("abc123".to_string()),
            status: "processed".to_string(),
            extraction: json!({ "result_text": "Total: $42" }),
        };
        assert_eq!(response.result_text(), Some("Total: $42"));
    }

    #[test]
    fn test_result_text_missing_or_malformed() {
        let mut response = RawExtractionResponse {
            whisper_hash: None,
            status: "processed".to_string(),
            extraction: Value::Null,
        };
        assert_eq!(response.result_text(), None);

        response.extraction = json!({ "result_text": 42 });
        assert_eq!(response.result_text(), None);

        response.extraction = json!("not an object");
        assert_eq!(response.result_text(), None);
    }
}
