//! Core Orchestrator implementation

use crate::config::ExtractionConfig;
use crate::error::ExtractorError;
use crate::naming::timestamp;
use crate::types::{EnrichmentStatus, PersistedArtifactSet, ProcessOutcome};
use chrono::Local;
use ocrflow_domain::{
    artifact_key, ArtifactStore, ExtractionClient, ExtractionJob, ExtractionResult, Highlights,
    LineSelector, RemoteEnrichmentError, UploadedDocument,
};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Typed outcome of the highlight request
enum Enrichment {
    Fetched(Highlights),
    Skipped,
    Failed(RemoteEnrichmentError),
}

impl Enrichment {
    /// Split into the highlights to report and the status to expose
    fn resolve(self) -> (Highlights, EnrichmentStatus) {
        match self {
            Enrichment::Fetched(highlights) => (highlights, EnrichmentStatus::Fetched),
            Enrichment::Skipped => (Highlights::new(), EnrichmentStatus::Skipped),
            Enrichment::Failed(e) => (
                Highlights::new(),
                EnrichmentStatus::Failed {
                    reason: e.to_string(),
                },
            ),
        }
    }
}

/// The Orchestrator drives one document through extraction and persistence
///
/// Holds no per-request state: one instance, shared behind an `Arc`, serves
/// any number of concurrent requests.
pub struct Orchestrator<C, S>
where
    C: ExtractionClient,
    S: ArtifactStore,
{
    client: Arc<C>,
    store: Arc<S>,
    config: ExtractionConfig,
}

impl<C, S> Orchestrator<C, S>
where
    C: ExtractionClient,
    S: ArtifactStore,
{
    /// Create a new Orchestrator
    pub fn new(client: C, store: S, config: ExtractionConfig) -> Self {
        Self::from_shared(Arc::new(client), Arc::new(store), config)
    }

    /// Create a new Orchestrator around already-shared collaborators
    pub fn from_shared(client: Arc<C>, store: Arc<S>, config: ExtractionConfig) -> Self {
        Self {
            client,
            store,
            config,
        }
    }

    /// The active configuration
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// The artifact store results are written to
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create the input and output namespaces
    ///
    /// A one-time bootstrap step; `process` never creates namespaces.
    pub async fn prepare(&self) -> Result<(), ExtractorError> {
        self.config.validate().map_err(ExtractorError::Config)?;
        self.store
            .ensure_namespace(&self.config.input_namespace)
            .await?;
        self.store
            .ensure_namespace(&self.config.output_namespace)
            .await?;
        Ok(())
    }

    /// Extract one document with the stored configuration
    pub async fn process(
        &self,
        document: UploadedDocument,
    ) -> Result<ProcessOutcome, ExtractorError> {
        self.process_with(document, &self.config).await
    }

    /// Extract one document with a per-call configuration
    ///
    /// Persists the upload first, so the original survives later failures.
    /// Result artifacts are only written once the remote job has completed.
    /// The namespaces named by `config` must already exist.
    pub async fn process_with(
        &self,
        document: UploadedDocument,
        config: &ExtractionConfig,
    ) -> Result<ProcessOutcome, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        let input_key = artifact_key(&config.input_namespace, &document.safe_filename());

        info!(
            "Starting extraction for '{}' ({} bytes)",
            document.filename(),
            document.len()
        );

        self.store
            .write_binary(&input_key, document.content())
            .await?;
        debug!("Stored upload as {}", input_key);

        // Submit and wait
        let params = config.submission_params();
        let response = timeout(
            config.wait_timeout(),
            self.client.submit(&document, &params),
        )
        .await
        .map_err(|_| ExtractorError::Timeout {
            secs: config.wait_timeout_secs,
        })??;

        let text = match response.result_text() {
            Some(text) => text.to_string(),
            None => {
                warn!(
                    "No result_text in extraction payload for '{}'; reporting empty text",
                    document.filename()
                );
                String::new()
            }
        };

        let job = ExtractionJob::new(response.whisper_hash, params);
        info!(
            "Extraction complete for '{}': {} chars, whisper_hash {:?}",
            document.filename(),
            text.len(),
            job.handle()
        );

        let (highlights, enrichment) = self.enrich(&job, config.highlight_lines).await.resolve();
        if let EnrichmentStatus::Failed { reason } = &enrichment {
            warn!(
                "Highlight enrichment failed for '{}', continuing without highlights: {}",
                document.filename(),
                reason
            );
        }

        let processed_at = timestamp(&Local::now());
        let result = ExtractionResult {
            filename: document.filename().to_string(),
            whisper_hash: job.whisper_hash.clone(),
            text,
            highlights,
            processed_at,
        };

        let artifacts = PersistedArtifactSet::new(
            input_key,
            &config.output_namespace,
            &document.base_name(),
            &result.processed_at,
        );
        self.persist(&result, &artifacts).await?;

        Ok(ProcessOutcome {
            result,
            artifacts,
            enrichment,
        })
    }

    /// Request highlights for a completed job; never fails the request
    async fn enrich(&self, job: &ExtractionJob, lines: LineSelector) -> Enrichment {
        let Some(whisper_hash) = job.handle() else {
            debug!("No whisper_hash issued; skipping highlight enrichment");
            return Enrichment::Skipped;
        };

        match self
            .client
            .fetch_highlights(whisper_hash, lines)
            .await
        {
            Ok(highlights) => {
                debug!("Fetched highlights for {} lines", highlights.len());
                Enrichment::Fetched(highlights)
            }
            Err(e) => Enrichment::Failed(e),
        }
    }

    /// Write the text and JSON artifacts of a result
    async fn persist(
        &self,
        result: &ExtractionResult,
        artifacts: &PersistedArtifactSet,
    ) -> Result<(), ExtractorError> {
        self.store
            .write_text(&artifacts.text_key, &result.text)
            .await?;
        self.store
            .write_structured(&artifacts.json_key, result)
            .await?;

        info!(
            "Persisted {} and {}",
            artifacts.text_key, artifacts.json_key
        );
        Ok(())
    }
}
