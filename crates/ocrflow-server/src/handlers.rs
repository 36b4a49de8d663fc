//! HTTP request handlers for the extraction service.
//!
//! Implements the document upload and health check endpoints using axum.

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use ocrflow_domain::{ArtifactStore, ExtractionClient, ExtractionResponse, UploadedDocument};
use ocrflow_extractor::{ExtractorError, Orchestrator, PersistedArtifactSet, ProcessOutcome};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// Multipart field carrying the document
pub const FILE_FIELD: &str = "file";

/// Shared application state
pub struct AppState<C, S>
where
    C: ExtractionClient,
    S: ArtifactStore,
{
    /// Orchestrator shared by every request
    pub orchestrator: Arc<Orchestrator<C, S>>,

    /// Largest accepted request body in bytes
    pub max_upload_bytes: usize,
}

impl<C, S> Clone for AppState<C, S>
where
    C: ExtractionClient,
    S: ArtifactStore,
{
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}

/// Query options of `POST /extract`
#[derive(Debug, Default, Deserialize)]
pub struct ExtractQuery {
    /// Also report where the artifacts were written
    #[serde(default)]
    pub include_artifacts: bool,

    /// Override the configured wait timeout for this request (seconds)
    #[serde(default)]
    pub wait_timeout_secs: Option<u64>,
}

/// Artifact locations reported on request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactLocations {
    /// Raw upload
    pub input: String,
    /// Extracted text
    pub text: String,
    /// Result JSON
    pub json: String,
}

impl From<PersistedArtifactSet> for ArtifactLocations {
    fn from(set: PersistedArtifactSet) -> Self {
        Self {
            input: set.input_key,
            text: set.text_key,
            json: set.json_key,
        }
    }
}

/// Successful extraction response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractResponse {
    /// Text, highlights and job handle
    #[serde(flatten)]
    pub response: ExtractionResponse,

    /// Present only with `?include_artifacts=true`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<ArtifactLocations>,
}

impl ExtractResponse {
    /// Build the response for a finished extraction
    pub fn from_outcome(outcome: ProcessOutcome, include_artifacts: bool) -> Self {
        Self {
            response: outcome.result.into(),
            artifacts: include_artifacts.then(|| outcome.artifacts.into()),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Service version
    pub version: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Stable error tag (`submission_error`, `timeout_error`, ...)
    pub kind: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// The orchestrator failed the request
    Extraction(ExtractorError),
    /// The upload itself was unusable
    InvalidRequest {
        /// Response status (400, or 413 for oversized bodies)
        status: StatusCode,
        /// What was wrong
        message: String,
    },
}

impl AppError {
    fn bad_request(message: impl Into<String>) -> Self {
        AppError::InvalidRequest {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            AppError::Extraction(e) => {
                let status = match &e {
                    ExtractorError::Submission(_) => StatusCode::BAD_GATEWAY,
                    ExtractorError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                    ExtractorError::Persistence(_)
                    | ExtractorError::Serialization(_)
                    | ExtractorError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.kind(), e.to_string())
            }
            AppError::InvalidRequest { status, message } => (status, "invalid_request", message),
        };

        let body = Json(ErrorResponse {
            error: message,
            kind: kind.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<ExtractorError> for AppError {
    fn from(e: ExtractorError) -> Self {
        AppError::Extraction(e)
    }
}

/// Pull the `file` field out of the upload form
async fn read_document(mut multipart: Multipart) -> Result<UploadedDocument, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| AppError::InvalidRequest {
        status: e.status(),
        message: format!("Failed to read form field: {}", e.body_text()),
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content = field.bytes().await.map_err(|e| AppError::InvalidRequest {
            status: e.status(),
            message: format!("Failed to read uploaded file: {}", e.body_text()),
        })?;

        return Ok(UploadedDocument::new(filename, content));
    }

    Err(AppError::bad_request(format!(
        "Missing multipart field '{}'",
        FILE_FIELD
    )))
}

/// POST /extract - Extract text from one uploaded document
async fn extract<C, S>(
    State(state): State<AppState<C, S>>,
    Query(query): Query<ExtractQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractResponse>, AppError>
where
    C: ExtractionClient + 'static,
    S: ArtifactStore + 'static,
{
    let multipart = multipart.map_err(|e| AppError::bad_request(e.body_text()))?;

    let config = match query.wait_timeout_secs {
        Some(secs) => {
            let config = state.orchestrator.config().clone().with_wait_timeout(secs);
            config.validate().map_err(AppError::bad_request)?;
            Some(config)
        }
        None => None,
    };

    let document = read_document(multipart).await?;

    let request_id = Uuid::now_v7();
    let span = info_span!("extract", %request_id, filename = %document.filename());

    async move {
        info!("Received upload ({} bytes)", document.len());

        let outcome = match &config {
            Some(config) => state.orchestrator.process_with(document, config).await,
            None => state.orchestrator.process(document).await,
        };

        match outcome {
            Ok(outcome) => Ok(Json(ExtractResponse::from_outcome(
                outcome,
                query.include_artifacts,
            ))),
            Err(e) => {
                error!("Extraction failed ({}): {}", e.kind(), e);
                Err(e.into())
            }
        }
    }
    .instrument(span)
    .await
}

/// GET /health - Liveness check
async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router<C, S>(state: AppState<C, S>) -> AxumRouter
where
    C: ExtractionClient + 'static,
    S: ArtifactStore + 'static,
{
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    AxumRouter::new()
        .route("/extract", post(extract::<C, S>))
        .route("/extract/", post(extract::<C, S>))
        .route("/health", get(health_check))
        .layer(body_limit)
        .with_state(state)
}
