//! Command-line definitions for the `ocrflow` binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ocrflow - Document text extraction through LLMWhisperer.
#[derive(Debug, Parser)]
#[command(name = "ocrflow")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP extraction service
    Serve(ServeArgs),

    /// Extract one local document and print the response JSON
    Extract(ExtractArgs),
}

/// Arguments for the serve command.
#[derive(Debug, Parser)]
pub struct ServeArgs {
    /// Configuration file path
    #[arg(short, long, env = "OCRFLOW_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Document to extract
    pub file: PathBuf,

    /// Configuration file path
    #[arg(short, long, env = "OCRFLOW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the wait timeout (seconds)
    #[arg(short, long)]
    pub wait_timeout: Option<u64>,

    /// Also print where the artifacts were written
    #[arg(long)]
    pub include_artifacts: bool,
}
