//! Drives one extraction run: prompt → Claude → parse → repair → metadata.
//!
//! Extraction is a single attempt. A failed call or an unparseable reply
//! aborts the run without writing anything; the raw reply of a parse
//! failure is preserved via `pipeline::diagnostic`.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;

use super::{parser, prompt, validate, ExtractionError};
use crate::config;
use crate::models::database::{ProcessingMetadata, RequirementsDatabase};
use crate::pipeline::diagnostic;
use crate::pipeline::llm::{CompletionClient, UsageTracker};
use crate::pipeline::normalize;
use crate::store;

pub struct DocumentProcessor {
    llm: Arc<dyn CompletionClient>,
    usage: Arc<UsageTracker>,
}

impl DocumentProcessor {
    pub fn new(llm: Arc<dyn CompletionClient>, usage: Arc<UsageTracker>) -> Self {
        Self { llm, usage }
    }

    /// Extract a requirements database from normalized document text.
    pub async fn extract(
        &self,
        document_text: &str,
    ) -> Result<RequirementsDatabase, ExtractionError> {
        if document_text.trim().is_empty() {
            return Err(ExtractionError::EmptyDocument);
        }

        let prompt = prompt::build_extraction_prompt(document_text);
        tracing::info!(chars = document_text.len(), "Sending document for extraction");

        let completion = self
            .llm
            .complete(&prompt, config::EXTRACTION_MAX_TOKENS, None)
            .await?;
        self.usage.record(&completion.usage);
        tracing::info!(
            input_tokens = completion.usage.input_tokens,
            output_tokens = completion.usage.output_tokens,
            "Extraction reply received"
        );

        let raw = match parser::parse_reply(&completion.text) {
            Ok(raw) => raw,
            Err(e) => {
                if let Some(dir) = diagnostic::dump_dir() {
                    diagnostic::dump_failed_reply(&dir, &completion.text);
                }
                return Err(e);
            }
        };

        let mut db = validate::build_database(raw);

        let snapshot = self.usage.snapshot();
        db.processing_metadata = ProcessingMetadata {
            processed_at: Some(Utc::now()),
            processor_version: config::APP_VERSION.to_string(),
            api_calls_used: snapshot.total_calls,
            total_cost: snapshot.total_cost,
        };

        Ok(db)
    }

    /// Batch entry point: read a text export, normalize, extract, persist.
    /// Nothing is written when any stage fails.
    pub async fn process_file(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<RequirementsDatabase, ExtractionError> {
        let raw_text = std::fs::read_to_string(input)?;
        let text = normalize::clean_text(&raw_text);
        tracing::info!(input = %input.display(), chars = text.len(), "Document loaded");

        let db = self.extract(&text).await?;
        store::save_database(&db, output)?;
        log_summary(&db);
        Ok(db)
    }
}

fn log_summary(db: &RequirementsDatabase) {
    tracing::info!(
        total = db.summary.total_requirements,
        general = db.summary.general_requirements_count,
        size = db.summary.size_specific_count,
        capacity = db.summary.capacity_specific_count,
        feature = db.summary.feature_specific_count,
        important = db.important_information.len(),
        "Extraction complete"
    );
    for authority in db
        .document_analysis
        .regulatory_authorities
        .iter()
        .take(5)
    {
        tracing::info!(authority = %authority, "Regulatory authority identified");
    }
    tracing::info!(
        api_calls = db.processing_metadata.api_calls_used,
        cost_usd = db.processing_metadata.total_cost,
        "API usage for this run"
    );
}
