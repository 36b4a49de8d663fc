//! Normalized extraction results

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Highlight metadata keyed by line number
///
/// Each entry carries positional data for one line of the extracted text
/// (`page`, `base_y`, `height`, `page_height`, ...).
pub type Highlights = Map<String, Value>;

/// The normalized outcome of one extraction
///
/// Serializes to the persisted JSON artifact: `filename`, `whisper_hash`,
/// `text`, `highlights`, `processed_at`. `highlights` is always present (an
/// empty object when enrichment failed) and `whisper_hash` is `null` when the
/// remote service issued none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Original filename of the upload
    pub filename: String,

    /// Job handle of the remote extraction
    pub whisper_hash: Option<String>,

    /// Extracted text, possibly empty
    pub text: String,

    /// Highlight metadata, possibly empty
    #[serde(default)]
    pub highlights: Highlights,

    /// Processing timestamp (`YYYYMMDD_HHMMSS`)
    pub processed_at: String,
}

impl ExtractionResult {
    /// Caller-facing view of the result
    pub fn response(&self) -> ExtractionResponse {
        ExtractionResponse {
            text: self.text.clone(),
            highlights: self.highlights.clone(),
            whisper_hash: self.whisper_hash.clone(),
        }
    }
}

/// Response returned across the document submission boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResponse {
    /// Extracted text
    pub text: String,

    /// Highlight metadata (never omitted)
    #[serde(default)]
    pub highlights: Highlights,

    /// Job handle, `null` when absent
    pub whisper_hash: Option<String>,
}

impl From<ExtractionResult> for ExtractionResponse {
    fn from(result: ExtractionResult) -> Self {
        Self {
            text: result.text,
            highlights: result.highlights,
            whisper_hash: result.whisper_hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ExtractionResult {
        ExtractionResult {
            filename: "invoice.pdf".to_string(),
            whisper_hash: Some("abc123".to_string()),
            text: "Total: $42".to_string(),
            highlights: Highlights::new(),
            processed_at: "20260101_120000".to_string(),
        }
    }

    #[test]
    fn test_empty_highlights_are_serialized() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["highlights"], json!({}));
        assert_eq!(value["whisper_hash"], json!("abc123"));
        assert_eq!(value["processed_at"], json!("20260101_120000"));
    }

    #[test]
    fn test_missing_hash_serializes_as_null() {
        let mut result = sample();
        result.whisper_hash = None;

        let value = serde_json::to_value(result.response()).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("whisper_hash"));
        assert_eq!(object["whisper_hash"], Value::Null);
        assert_eq!(object["highlights"], json!({}));
        assert_eq!(object.len(), 3);
    }

    #[test]
    fn test_response_from_result() {
        let mut result = sample();
        result
            .highlights
            .insert("1".to_string(), json!({ "page": 0, "base_y": 120 }));

        let response = ExtractionResponse::from(result.clone());
        assert_eq!(response, result.response());
        assert_eq!(response.highlights["1"]["base_y"], json!(120));
    }
}
