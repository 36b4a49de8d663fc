//! ocrflow - Document text extraction service
//!
//! `ocrflow serve` runs the HTTP service; `ocrflow extract FILE` runs one
//! local document through the same pipeline.

use anyhow::Context;
use clap::Parser;
use ocrflow_domain::UploadedDocument;
use ocrflow_server::cli::{Cli, Command, ExtractArgs, ServeArgs};
use ocrflow_server::handlers::ExtractResponse;
use ocrflow_server::{bootstrap, load_config, start_server};
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize tracing (log to stderr, RUST_LOG overrides)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Extract(args) => extract(args).await,
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    if args.config.is_none() {
        eprintln!("Warning: No config file specified, using defaults and environment");
        eprintln!("Usage: ocrflow serve --config <path-to-config.toml>");
    }

    let config = load_config(args.config.as_deref()).context("failed to load configuration")?;
    start_server(config).await?;
    Ok(())
}

async fn extract(args: ExtractArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref()).context("failed to load configuration")?;

    let content = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let filename = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let orchestrator = bootstrap(&config).await?;
    let extraction = match args.wait_timeout {
        Some(secs) => orchestrator.config().clone().with_wait_timeout(secs),
        None => orchestrator.config().clone(),
    };
    let outcome = orchestrator
        .process_with(UploadedDocument::new(filename, content), &extraction)
        .await
        .with_context(|| format!("extraction of {} failed", args.file.display()))?;

    // Report filesystem paths rather than store keys
    let mut response = ExtractResponse::from_outcome(outcome, args.include_artifacts);
    if let Some(artifacts) = response.artifacts.as_mut() {
        let store = orchestrator.store();
        for location in [&mut artifacts.input, &mut artifacts.text, &mut artifacts.json] {
            let path = store.path_for(location)?;
            *location = path.display().to_string();
        }
    }
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
