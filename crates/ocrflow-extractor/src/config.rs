//! Configuration for the Orchestrator

use ocrflow_domain::options::DEFAULT_WAIT_TIMEOUT_SECS;
use ocrflow_domain::{LineSelector, OutputMode, ProcessingMode, SubmissionParams};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Maximum time to wait for the remote job to complete (seconds)
    pub wait_timeout_secs: u64,

    /// Layout of the returned text
    pub output_mode: OutputMode,

    /// OCR engine mode
    pub processing_mode: ProcessingMode,

    /// Prefix returned lines with line numbers
    pub add_line_nos: bool,

    /// Lines to request highlight metadata for
    pub highlight_lines: LineSelector,

    /// Namespace for raw uploads
    pub input_namespace: String,

    /// Namespace for extracted text and result JSON
    pub output_namespace: String,
}

impl ExtractionConfig {
    /// Get the wait timeout as a Duration
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    /// Override the wait timeout
    pub fn with_wait_timeout(mut self, secs: u64) -> Self {
        self.wait_timeout_secs = secs;
        self
    }

    /// Submission parameters for one blocking extraction
    pub fn submission_params(&self) -> SubmissionParams {
        SubmissionParams {
            wait_for_completion: true,
            wait_timeout_secs: self.wait_timeout_secs,
            add_line_nos: self.add_line_nos,
            output_mode: self.output_mode,
            mode: self.processing_mode,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.wait_timeout_secs == 0 {
            return Err("wait_timeout_secs must be greater than 0".to_string());
        }
        for (name, namespace) in [
            ("input_namespace", &self.input_namespace),
            ("output_namespace", &self.output_namespace),
        ] {
            let trimmed = namespace.trim_matches('/');
            if trimmed.is_empty() {
                return Err(format!("{} must not be empty", name));
            }
            if trimmed.split('/').any(|s| s.is_empty() || s == "." || s == "..") {
                return Err(format!("{} must be a plain relative path: {:?}", name, namespace));
            }
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            wait_timeout_secs: DEFAULT_WAIT_TIMEOUT_SECS,
            output_mode: OutputMode::LayoutPreserving,
            processing_mode: ProcessingMode::Form,
            add_line_nos: true,
            highlight_lines: LineSelector::All,
            input_namespace: "inputfiles".to_string(),
            output_namespace: "outputfiles".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.wait_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_submission_params_always_wait() {
        let config = ExtractionConfig {
            output_mode: OutputMode::Text,
            add_line_nos: false,
            ..ExtractionConfig::default()
        }
        .with_wait_timeout(30);

        let params = config.submission_params();
        assert!(params.wait_for_completion);
        assert_eq!(params.wait_timeout_secs, 30);
        assert!(!params.add_line_nos);
        assert_eq!(params.output_mode, OutputMode::Text);
    }

    #[test]
    fn test_invalid_wait_timeout() {
        let config = ExtractionConfig::default().with_wait_timeout(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_namespaces() {
        for bad in ["", "/", "../out", "a/../b"] {
            let config = ExtractionConfig {
                output_namespace: bad.to_string(),
                ..ExtractionConfig::default()
            };
            assert!(config.validate().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ExtractionConfig::from_toml(
            r#"
            wait_timeout_secs = 60
            output_mode = "text"
            highlight_lines = "1-20"
            "#,
        )
        .unwrap();

        assert_eq!(config.wait_timeout_secs, 60);
        assert_eq!(config.output_mode, OutputMode::Text);
        assert_eq!(config.highlight_lines, LineSelector::Range { start: 1, end: 20 });
        assert!(config.add_line_nos);
        assert_eq!(config.input_namespace, "inputfiles");
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractionConfig::default();
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractionConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }
}
