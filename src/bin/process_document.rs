//! Operator batch job: one extraction run, document text in, processed
//! requirements database out.
//!
//! `DOCUMENT_PATH` points at the plain-text export of the regulatory
//! document; `OUTPUT_PATH` at the database file (default is where the
//! serving process looks for it). A failed run writes nothing.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use rishui::config;
use rishui::pipeline::extract::DocumentProcessor;
use rishui::pipeline::llm::{ClaudeClient, UsageTracker};

#[tokio::main]
async fn main() -> ExitCode {
    rishui::init_tracing();
    tracing::info!(
        "{} document processor v{}",
        config::APP_NAME,
        config::APP_VERSION
    );

    let document_path = std::env::var("DOCUMENT_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("regulatory_document.txt"));
    let output_path = std::env::var("OUTPUT_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| config::database_path());

    if !document_path.exists() {
        tracing::error!(
            path = %document_path.display(),
            "Document not found, point DOCUMENT_PATH at the text export"
        );
        return ExitCode::FAILURE;
    }

    let client = match ClaudeClient::from_env(config::EXTRACTION_MODEL) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Cannot initialize the extraction model");
            return ExitCode::FAILURE;
        }
    };

    let processor = DocumentProcessor::new(Arc::new(client), Arc::new(UsageTracker::new()));
    match processor.process_file(&document_path, &output_path).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Document processing failed");
            ExitCode::FAILURE
        }
    }
}
