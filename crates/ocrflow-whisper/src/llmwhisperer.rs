//! LLMWhisperer Client Implementation
//!
//! Provides integration with the LLMWhisperer v2 text extraction API.
//!
//! # Protocol
//!
//! - `POST /whisper` uploads the document and returns a whisper hash (202)
//! - `GET /whisper-status` reports `accepted`, `processing`, `processed` or `error`
//! - `GET /whisper-retrieve` returns the extraction payload once processed
//! - `GET /highlights` returns per-line positional metadata
//!
//! Every request carries the API key in the `unstract-key` header. The
//! completion wait is bounded by `wait_timeout_secs`: each HTTP call is
//! clamped to the remaining budget, so a hung remote cannot stretch it.
//! No request is ever retried.
//!
//! # Examples
//!
//! ```no_run
//! use ocrflow_whisper::WhisperClient;
//!
//! let client = WhisperClient::new(
//!     "https://llmwhisperer-api.us-central.unstract.com/api/v2",
//!     "my-api-key",
//! ).unwrap();
//! ```

use crate::ClientError;
use async_trait::async_trait;
use ocrflow_domain::{
    ExtractionClient, Highlights, LineSelector, RawExtractionResponse, RemoteEnrichmentError,
    RemoteSubmissionError, SubmissionParams, UploadedDocument,
};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Default LLMWhisperer API endpoint
pub const DEFAULT_BASE_URL: &str = "https://llmwhisperer-api.us-central.unstract.com/api/v2";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "LLMWHISPERER_API_KEY";

/// Environment variable overriding the base URL
pub const BASE_URL_ENV: &str = "LLMWHISPERER_BASE_URL";

/// Default interval between status polls (5 seconds)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Default upper bound for a single HTTP request (60 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

const API_KEY_HEADER: &str = "unstract-key";

const STATUS_PROCESSED: &str = "processed";
const STATUS_ERROR: &str = "error";

/// LLMWhisperer API client
///
/// Cheap to clone; clones share the underlying connection pool. Holds no
/// per-request state, so one instance serves any number of concurrent
/// extractions.
#[derive(Clone)]
pub struct WhisperClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    poll_interval: Duration,
    request_timeout: Duration,
}

/// Body of the `202 Accepted` submission response
#[derive(Deserialize)]
struct WhisperAccepted {
    #[serde(default)]
    whisper_hash: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Body of the status endpoint
#[derive(Deserialize)]
struct WhisperStatus {
    status: String,
    #[serde(default)]
    message: Option<String>,
}

impl WhisperClient {
    /// Create a new client
    ///
    /// # Parameters
    ///
    /// - `base_url`: API root (e.g., the `DEFAULT_BASE_URL`)
    /// - `api_key`: LLMWhisperer API key
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` if either value is blank.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        let api_key = api_key.into().trim().to_string();

        if base_url.is_empty() {
            return Err(ClientError::Config("base URL must not be empty".to_string()));
        }
        if api_key.is_empty() {
            return Err(ClientError::Config(format!(
                "API key must not be empty (set {})",
                API_KEY_ENV
            )));
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;

        Ok(Self {
            base_url,
            api_key,
            client,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }

    /// Create a client from `LLMWHISPERER_API_KEY` and, optionally,
    /// `LLMWHISPERER_BASE_URL`
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_env_with(|name| std::env::var(name).ok())
    }

    /// Like `from_env`, reading variables through `lookup`
    ///
    /// Blank values count as unset.
    pub fn from_env_with<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = lookup(API_KEY_ENV)
            .ok_or_else(|| ClientError::Config(format!("{} not set", API_KEY_ENV)))?;
        let base_url = lookup(BASE_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::new(base_url, api_key)
    }

    /// Set the interval between status polls
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the upper bound for a single HTTP request
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// The API root this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(self.url(path))
            .header(API_KEY_HEADER, &self.api_key)
    }

    /// Time left for one request, or `Timeout` once the wait budget is spent
    fn request_budget(&self, deadline: Instant, secs: u64) -> Result<Duration, RemoteSubmissionError> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(RemoteSubmissionError::Timeout { secs });
        }
        Ok(remaining.min(self.request_timeout))
    }

    /// Send a request belonging to a submission, mapping failures
    async fn send_submission(
        &self,
        request: RequestBuilder,
        deadline: Instant,
        secs: u64,
    ) -> Result<Response, RemoteSubmissionError> {
        let budget = self.request_budget(deadline, secs)?;

        let response = request.timeout(budget).send().await.map_err(|e| {
            deadline_error(e, deadline, secs, |e| {
                RemoteSubmissionError::Unreachable(e.to_string())
            })
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                RemoteSubmissionError::Unauthorized(body)
            }
            _ => RemoteSubmissionError::Rejected {
                status: status.as_u16(),
                message: body,
            },
        })
    }

    /// Upload the document and start the remote job
    async fn start(
        &self,
        document: &UploadedDocument,
        params: &SubmissionParams,
        deadline: Instant,
    ) -> Result<WhisperAccepted, RemoteSubmissionError> {
        let request = self
            .client
            .post(self.url("whisper"))
            .header(API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .query(&[
                ("mode", params.mode.as_str()),
                ("output_mode", params.output_mode.as_str()),
                ("add_line_nos", if params.add_line_nos { "true" } else { "false" }),
                ("file_name", document.safe_filename().as_str()),
            ])
            .body(document.content().clone());

        let response = self
            .send_submission(request, deadline, params.wait_timeout_secs)
            .await?;

        response
            .json::<WhisperAccepted>()
            .await
            .map_err(|e| {
                deadline_error(e, deadline, params.wait_timeout_secs, |e| {
                    RemoteSubmissionError::InvalidResponse(format!(
                        "Failed to parse submission response: {}",
                        e
                    ))
                })
            })
    }

    /// Poll the status endpoint until the job is processed, failed, or out of time
    async fn wait_for_completion(
        &self,
        whisper_hash: &str,
        deadline: Instant,
        secs: u64,
    ) -> Result<(), RemoteSubmissionError> {
        loop {
            let request = self
                .get("whisper-status")
                .query(&[("whisper_hash", whisper_hash)]);
            let status = self
                .send_submission(request, deadline, secs)
                .await?
                .json::<WhisperStatus>()
                .await
                .map_err(|e| {
                    deadline_error(e, deadline, secs, |e| {
                        RemoteSubmissionError::InvalidResponse(format!(
                            "Failed to parse status: {}",
                            e
                        ))
                    })
                })?;

            match status.status.as_str() {
                STATUS_PROCESSED => return Ok(()),
                STATUS_ERROR => {
                    return Err(RemoteSubmissionError::Processing(
                        status
                            .message
                            .unwrap_or_else(|| "remote job failed".to_string()),
                    ));
                }
                other => debug!(whisper_hash, status = other, "Whisper job still in progress"),
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(RemoteSubmissionError::Timeout { secs });
            }
            tokio::time::sleep(self.poll_interval.min(remaining)).await;
        }
    }

    /// Fetch the extraction payload of a processed job
    ///
    /// A body that is not JSON yields `Value::Null`; the caller treats that
    /// as "no text" rather than a failed extraction.
    async fn retrieve(
        &self,
        whisper_hash: &str,
        deadline: Instant,
        secs: u64,
    ) -> Result<Value, RemoteSubmissionError> {
        let request = self
            .get("whisper-retrieve")
            .query(&[("whisper_hash", whisper_hash), ("text_only", "false")]);
        let body = self
            .send_submission(request, deadline, secs)
            .await?
            .bytes()
            .await
            .map_err(|e| {
                deadline_error(e, deadline, secs, |e| {
                    RemoteSubmissionError::Unreachable(e.to_string())
                })
            })?;

        Ok(serde_json::from_slice(&body).unwrap_or_else(|e| {
            warn!(whisper_hash, error = %e, "Extraction payload is not valid JSON");
            Value::Null
        }))
    }
}

impl fmt::Debug for WhisperClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhisperClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("poll_interval", &self.poll_interval)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[async_trait]
impl ExtractionClient for WhisperClient {
    async fn submit(
        &self,
        document: &UploadedDocument,
        params: &SubmissionParams,
    ) -> Result<RawExtractionResponse, RemoteSubmissionError> {
        let secs = params.wait_timeout_secs;
        let deadline = Instant::now() + Duration::from_secs(secs);

        let accepted = self.start(document, params, deadline).await?;
        let status = accepted.status.unwrap_or_default();
        info!(
            filename = document.filename(),
            whisper_hash = accepted.whisper_hash.as_deref().unwrap_or(""),
            status = %status,
            "Document submitted to LLMWhisperer"
        );

        if !params.wait_for_completion {
            return Ok(RawExtractionResponse {
                whisper_hash: accepted.whisper_hash,
                status,
                extraction: Value::Object(Default::default()),
            });
        }

        let whisper_hash = accepted.whisper_hash.ok_or_else(|| {
            RemoteSubmissionError::InvalidResponse(
                "submission accepted without a whisper_hash".to_string(),
            )
        })?;

        self.wait_for_completion(&whisper_hash, deadline, secs).await?;
        let extraction = self.retrieve(&whisper_hash, deadline, secs).await?;

        Ok(RawExtractionResponse {
            whisper_hash: Some(whisper_hash),
            status: STATUS_PROCESSED.to_string(),
            extraction,
        })
    }

    async fn fetch_highlights(
        &self,
        whisper_hash: &str,
        lines: LineSelector,
    ) -> Result<Highlights, RemoteEnrichmentError> {
        let lines = lines.to_string();
        let response = self
            .get("highlights")
            .query(&[("whisper_hash", whisper_hash), ("lines", lines.as_str())])
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| RemoteEnrichmentError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RemoteEnrichmentError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        match response.json::<Value>().await {
            Ok(Value::Object(highlights)) => Ok(highlights),
            Ok(other) => Err(RemoteEnrichmentError::InvalidResponse(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
            Err(e) => Err(RemoteEnrichmentError::InvalidResponse(e.to_string())),
        }
    }
}

/// A request that timed out at or past the wait deadline is a `Timeout`,
/// whether it stalled on the headers or on the body
fn deadline_error<F>(
    e: reqwest::Error,
    deadline: Instant,
    secs: u64,
    otherwise: F,
) -> RemoteSubmissionError
where
    F: FnOnce(reqwest::Error) -> RemoteSubmissionError,
{
    if e.is_timeout() && Instant::now() >= deadline {
        RemoteSubmissionError::Timeout { secs }
    } else {
        otherwise(e)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
