//! Requirements extraction: one Claude call over the normalized document,
//! parsed and repaired into the canonical database.

pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod validate;

pub use orchestrator::DocumentProcessor;

use thiserror::Error;

use crate::pipeline::llm::LlmError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("AI processing failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Could not parse requirements from reply: {0}")]
    SchemaParse(String),

    #[error("Document is empty after normalization")]
    EmptyDocument,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}
