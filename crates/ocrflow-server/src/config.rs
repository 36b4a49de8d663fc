//! Configuration file parsing for the server.
//!
//! Loads settings from a TOML file, then overlays the environment. The API
//! credential is expected to come from the environment (or a `.env` file),
//! never from a checked-in config file.

use ocrflow_extractor::ExtractionConfig;
use ocrflow_whisper::llmwhisperer::{
    API_KEY_ENV, BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_POLL_INTERVAL_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the artifact root directory
pub const STORAGE_ROOT_ENV: &str = "OCRFLOW_STORAGE_ROOT";

/// Default upload limit: 50 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// A field holds an unusable value
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8080)
    pub bind_port: u16,

    /// Largest accepted request body in bytes
    pub max_upload_bytes: usize,

    /// Remote OCR service
    pub whisper: WhisperSettings,

    /// Artifact storage
    pub storage: StorageSettings,

    /// Extraction behavior
    pub extraction: ExtractionConfig,
}

/// Remote OCR service settings
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct WhisperSettings {
    /// API base URL
    pub base_url: String,

    /// API credential; normally supplied through `LLMWHISPERER_API_KEY`
    pub api_key: Option<String>,

    /// Seconds between status checks
    pub poll_interval_secs: u64,

    /// Upper bound for any single HTTP call (seconds)
    pub request_timeout_secs: u64,
}

impl fmt::Debug for WhisperSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhisperSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for WhisperSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Artifact storage settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory holding the input and output namespaces
    pub root: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("data"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8080,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            whisper: WhisperSettings::default(),
            storage: StorageSettings::default(),
            extraction: ExtractionConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Overlay values from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Overlay values from `lookup`; blank values are ignored
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = lookup(API_KEY_ENV) {
            self.whisper.api_key = Some(key);
        }
        if let Some(url) = lookup(BASE_URL_ENV) {
            self.whisper.base_url = url;
        }
        if let Some(root) = lookup(STORAGE_ROOT_ENV) {
            self.storage.root = PathBuf::from(root);
        }
    }

    /// Check the configuration before anything is built from it
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.whisper.api_key {
            Some(key) if !key.trim().is_empty() => {}
            _ => {
                return Err(ConfigError::MissingField(format!(
                    "whisper.api_key (set {})",
                    API_KEY_ENV
                )))
            }
        }
        if self.whisper.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField("whisper.base_url".to_string()));
        }
        if self.whisper.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "whisper.poll_interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.whisper.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "whisper.request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_upload_bytes must be greater than 0".to_string(),
            ));
        }
        self.extraction.validate().map_err(ConfigError::Invalid)
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        ServerConfig {
            whisper: WhisperSettings {
                api_key: Some("test-api-key".to_string()),
                ..WhisperSettings::default()
            },
            ..ServerConfig::default()
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}
