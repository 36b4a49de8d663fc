//! ocrflow Server
//!
//! HTTP front door and process bootstrap for the extraction service.
//! Receives document uploads, runs them through the orchestrator and returns
//! the extracted text with its highlight metadata.

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod handlers;

use config::{ConfigError, ServerConfig};
use handlers::{create_router, AppState};
use ocrflow_extractor::{ExtractorError, Orchestrator};
use ocrflow_store::FsArtifactStore;
use ocrflow_whisper::{ClientError, WhisperClient};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, info};

/// The orchestrator as wired by `bootstrap`
pub type ServiceOrchestrator = Orchestrator<WhisperClient, FsArtifactStore>;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The remote OCR client could not be built
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    /// Namespace creation failed
    #[error("Initialization error: {0}")]
    Init(#[from] ExtractorError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Load configuration from `.env`, an optional TOML file and the environment
pub fn load_config(path: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => return Err(ConfigError::Invalid(format!(".env: {}", e))),
    }

    let mut config = match path {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    config.apply_env();
    config.validate()?;
    Ok(config)
}

/// Build the process-wide collaborators
///
/// Constructs the remote client once, creates both artifact namespaces and
/// returns the orchestrator every request will share.
pub async fn bootstrap(config: &ServerConfig) -> Result<ServiceOrchestrator, ServerError> {
    config.validate()?;

    let api_key = config.whisper.api_key.clone().unwrap_or_default();
    let client = WhisperClient::new(&config.whisper.base_url, api_key)?
        .with_poll_interval(Duration::from_secs(config.whisper.poll_interval_secs))
        .with_request_timeout(Duration::from_secs(config.whisper.request_timeout_secs));

    let store = FsArtifactStore::new(&config.storage.root);
    let orchestrator = Orchestrator::new(client, store, config.extraction.clone());
    orchestrator.prepare().await?;

    info!("Remote OCR service: {}", config.whisper.base_url);
    info!("Artifact root: {}", config.storage.root.display());
    info!(
        "Wait timeout: {} seconds, output mode: {}",
        config.extraction.wait_timeout_secs, config.extraction.output_mode
    );

    Ok(orchestrator)
}

/// Start the HTTP server
///
/// Bootstraps the orchestrator and serves until the process is stopped.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Starting ocrflow server");

    let orchestrator = bootstrap(&config).await?;
    let state = AppState {
        orchestrator: Arc::new(orchestrator),
        max_upload_bytes: config.max_upload_bytes,
    };

    let app = create_router(state);

    // Bind and serve
    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
