//! Integration tests for the Orchestrator

#[cfg(test)]
mod tests {
    use crate::{EnrichmentStatus, ExtractionConfig, ExtractorError, Orchestrator};
    use ocrflow_domain::{
        ExtractionResult, Highlights, RemoteEnrichmentError, RemoteSubmissionError,
        UploadedDocument,
    };
    use ocrflow_store::{FsArtifactStore, MemoryArtifactStore};
    use ocrflow_whisper::MockExtractionClient;
    use serde_json::{json, Value};
    use std::time::{Duration, Instant};

    fn invoice() -> UploadedDocument {
        UploadedDocument::new("invoice.pdf", b"%PDF-1.7 invoice".to_vec())
    }

    async fn orchestrator_with(
        client: MockExtractionClient,
        config: ExtractionConfig,
    ) -> (
        Orchestrator<MockExtractionClient, MemoryArtifactStore>,
        MemoryArtifactStore,
    ) {
        let store = MemoryArtifactStore::new();
        let orchestrator = Orchestrator::new(client, store.clone(), config);
        orchestrator.prepare().await.unwrap();
        (orchestrator, store)
    }

    #[tokio::test]
    async fn test_full_extraction_flow() {
        let client = MockExtractionClient::new("Total: $42")
            .with_whisper_hash("abc123")
            .fail_highlights(RemoteEnrichmentError::Rejected {
                status: 500,
                message: "upstream error".into(),
            });
        let (orchestrator, store) =
            orchestrator_with(client.clone(), ExtractionConfig::default()).await;

        let outcome = orchestrator.process(invoice()).await.unwrap();

        // Caller-facing response
        let response = outcome.result.response();
        assert_eq!(response.text, "Total: $42");
        assert_eq!(response.whisper_hash.as_deref(), Some("abc123"));
        assert!(response.highlights.is_empty());
        assert!(matches!(outcome.enrichment, EnrichmentStatus::Failed { .. }));

        // Artifacts
        let artifacts = &outcome.artifacts;
        let prefix = format!("outputfiles/invoice_{}", outcome.result.processed_at);
        assert_eq!(artifacts.input_key, "inputfiles/invoice.pdf");
        assert_eq!(artifacts.text_key, format!("{}_extracted.txt", prefix));
        assert_eq!(artifacts.json_key, format!("{}_result.json", prefix));

        assert_eq!(
            store.read(&artifacts.input_key),
            Some(b"%PDF-1.7 invoice".to_vec())
        );
        assert_eq!(
            store.read_text(&artifacts.text_key).as_deref(),
            Some("Total: $42")
        );

        let json_text = store.read_text(&artifacts.json_key).unwrap();
        let persisted: Value = serde_json::from_str(&json_text).unwrap();
        assert_eq!(persisted["filename"], "invoice.pdf");
        assert_eq!(persisted["whisper_hash"], "abc123");
        assert_eq!(persisted["text"], "Total: $42");
        assert_eq!(persisted["highlights"], json!({}));
        assert_eq!(persisted["processed_at"], outcome.result.processed_at.as_str());

        assert_eq!(store.len(), 3);
        assert_eq!(client.submit_calls(), 1);
        assert_eq!(client.highlight_calls(), 1);
    }

    #[tokio::test]
    async fn test_highlights_are_attached() {
        let mut highlights = Highlights::new();
        highlights.insert(
            "1".to_string(),
            json!({"page": 0, "base_y": 155, "height": 51, "page_height": 3168}),
        );
        let client = MockExtractionClient::new("line one").with_highlights(highlights.clone());
        let (orchestrator, store) =
            orchestrator_with(client, ExtractionConfig::default()).await;

        let outcome = orchestrator.process(invoice()).await.unwrap();

        assert_eq!(outcome.enrichment, EnrichmentStatus::Fetched);
        assert_eq!(outcome.result.highlights, highlights);

        let json_text = store.read_text(&outcome.artifacts.json_key).unwrap();
        let persisted: ExtractionResult = serde_json::from_str(&json_text).unwrap();
        assert_eq!(persisted, outcome.result);
    }

    #[tokio::test]
    async fn test_submission_failure_writes_no_results() {
        let client = MockExtractionClient::default().fail_submission(
            RemoteSubmissionError::Unauthorized("invalid unstract-key".into()),
        );
        let (orchestrator, store) =
            orchestrator_with(client.clone(), ExtractionConfig::default()).await;

        let result = orchestrator.process(invoice()).await;

        match result {
            Err(ExtractorError::Submission(RemoteSubmissionError::Unauthorized(_))) => {}
            other => panic!("expected submission error, got {:?}", other),
        }
        assert_eq!(store.keys(), vec!["inputfiles/invoice.pdf"]);
        assert!(store.keys_under("outputfiles/").is_empty());
        assert_eq!(client.highlight_calls(), 0);
    }

    #[tokio::test]
    async fn test_client_timeout_is_reported_as_timeout() {
        let client = MockExtractionClient::default()
            .fail_submission(RemoteSubmissionError::Timeout { secs: 300 });
        let (orchestrator, store) =
            orchestrator_with(client, ExtractionConfig::default()).await;

        let err = orchestrator.process(invoice()).await.unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(err.kind(), "timeout_error");
        assert!(store.keys_under("outputfiles/").is_empty());
    }

    #[tokio::test]
    async fn test_wait_bound_is_enforced() {
        let client = MockExtractionClient::new("late").with_submit_delay(Duration::from_secs(10));
        let config = ExtractionConfig::default().with_wait_timeout(1);
        let (orchestrator, store) = orchestrator_with(client, config).await;

        let started = Instant::now();
        let err = orchestrator.process(invoice()).await.unwrap_err();

        assert!(matches!(err, ExtractorError::Timeout { secs: 1 }));
        assert!(started.elapsed() < Duration::from_secs(3));
        assert_eq!(store.keys(), vec!["inputfiles/invoice.pdf"]);
    }

    #[tokio::test]
    async fn test_per_call_wait_timeout() {
        let client = MockExtractionClient::new("slow").with_submit_delay(Duration::from_secs(2));
        let (orchestrator, store) =
            orchestrator_with(client.clone(), ExtractionConfig::default()).await;
        let short = orchestrator.config().clone().with_wait_timeout(1);

        let started = Instant::now();
        let err = orchestrator.process_with(invoice(), &short).await.unwrap_err();
        assert!(matches!(err, ExtractorError::Timeout { secs: 1 }));
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(store.keys_under("outputfiles/").is_empty());

        // The stored configuration is untouched by the override
        let outcome = orchestrator.process(invoice()).await.unwrap();
        assert_eq!(outcome.result.text, "slow");
        assert_eq!(orchestrator.config().wait_timeout_secs, 300);
        assert_eq!(client.submit_calls(), 2);
    }

    #[tokio::test]
    async fn test_invalid_per_call_config_is_rejected() {
        let client = MockExtractionClient::default();
        let (orchestrator, store) =
            orchestrator_with(client.clone(), ExtractionConfig::default()).await;
        let invalid = ExtractionConfig::default().with_wait_timeout(0);

        let err = orchestrator.process_with(invoice(), &invalid).await.unwrap_err();

        assert!(matches!(err, ExtractorError::Config(_)));
        assert_eq!(client.submit_calls(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_output_write_failure_is_fatal() {
        let (orchestrator, store) =
            orchestrator_with(MockExtractionClient::default(), ExtractionConfig::default()).await;
        store.fail_writes_under("outputfiles/");

        let err = orchestrator.process(invoice()).await.unwrap_err();

        assert!(matches!(err, ExtractorError::Persistence(_)));
        assert_eq!(err.kind(), "persistence_error");
    }

    #[tokio::test]
    async fn test_input_write_failure_stops_before_submission() {
        let client = MockExtractionClient::default();
        let (orchestrator, store) =
            orchestrator_with(client.clone(), ExtractionConfig::default()).await;
        store.fail_writes_under("inputfiles/");

        let err = orchestrator.process(invoice()).await.unwrap_err();

        assert!(matches!(err, ExtractorError::Persistence(_)));
        assert_eq!(client.submit_calls(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_payload_yields_empty_text() {
        let client = MockExtractionClient::new("unused")
            .with_extraction(json!({"unexpected": true}));
        let (orchestrator, store) =
            orchestrator_with(client, ExtractionConfig::default()).await;

        let outcome = orchestrator.process(invoice()).await.unwrap();

        assert_eq!(outcome.result.text, "");
        assert_eq!(
            store.read_text(&outcome.artifacts.text_key).as_deref(),
            Some("")
        );
    }

    #[tokio::test]
    async fn test_path_components_are_stripped_from_input_key() {
        let (orchestrator, store) =
            orchestrator_with(MockExtractionClient::default(), ExtractionConfig::default()).await;

        let document = UploadedDocument::new("../../etc/scan.png", b"png".to_vec());
        let outcome = orchestrator.process(document).await.unwrap();

        assert_eq!(outcome.artifacts.input_key, "inputfiles/scan.png");
        assert_eq!(outcome.result.filename, "../../etc/scan.png");
        assert!(outcome.artifacts.text_key.starts_with("outputfiles/scan_"));
        assert!(store.read("inputfiles/scan.png").is_some());
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_independent() {
        let client = MockExtractionClient::echo();
        let (orchestrator, store) =
            orchestrator_with(client.clone(), ExtractionConfig::default()).await;

        let first = UploadedDocument::new("first.txt", b"alpha".to_vec());
        let second = UploadedDocument::new("second.txt", b"beta".to_vec());

        let (a, b) = tokio::join!(orchestrator.process(first), orchestrator.process(second));
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(a.result.text, "alpha");
        assert_eq!(b.result.text, "beta");
        assert_eq!(store.read_text(&a.artifacts.text_key).as_deref(), Some("alpha"));
        assert_eq!(store.read_text(&b.artifacts.text_key).as_deref(), Some("beta"));
        assert_eq!(client.submit_calls(), 2);
        assert_eq!(store.len(), 6);
    }

    #[tokio::test]
    async fn test_full_flow_on_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path());
        let client = MockExtractionClient::new("Total: $42").with_whisper_hash("abc123");
        let orchestrator = Orchestrator::new(client, store, ExtractionConfig::default());
        orchestrator.prepare().await.unwrap();

        let outcome = orchestrator.process(invoice()).await.unwrap();

        let input = std::fs::read(dir.path().join("inputfiles/invoice.pdf")).unwrap();
        assert_eq!(input, b"%PDF-1.7 invoice");

        let text = std::fs::read_to_string(dir.path().join(&outcome.artifacts.text_key)).unwrap();
        assert_eq!(text, "Total: $42");

        let json_text =
            std::fs::read_to_string(dir.path().join(&outcome.artifacts.json_key)).unwrap();
        let persisted: ExtractionResult = serde_json::from_str(&json_text).unwrap();
        assert_eq!(persisted, outcome.result);
    }
}
