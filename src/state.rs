//! Shared application state.
//!
//! `AppState` is built once at startup and handed to the API layer in an
//! `Arc`: the loaded requirements database behind an `RwLock` (written
//! only at load time, read by every request), the optional narrative
//! model client, and the process-wide usage tracker.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use thiserror::Error;

use crate::config;
use crate::models::RequirementsDatabase;
use crate::pipeline::llm::{CompletionClient, UsageTracker};
use crate::store::{self, StoreError};

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Database load error: {0}")]
    Store(#[from] StoreError),
}

/// Shared state behind every API handler.
pub struct AppState {
    /// Extracted requirements database. `None` until a processed file has
    /// been loaded; handlers answer 503 in that window.
    database: RwLock<Option<Arc<RequirementsDatabase>>>,
    /// Narrative model client. `None` runs report generation in
    /// deterministic fallback mode.
    pub narrative_client: Option<Arc<dyn CompletionClient>>,
    /// Token/cost accounting across every model call this process makes.
    pub usage: Arc<UsageTracker>,
    /// Where the processed database lives on disk.
    pub database_path: PathBuf,
    /// Where survey submissions are archived.
    pub responses_dir: PathBuf,
}

impl AppState {
    pub fn new(narrative_client: Option<Arc<dyn CompletionClient>>) -> Self {
        Self {
            database: RwLock::new(None),
            narrative_client,
            usage: Arc::new(UsageTracker::new()),
            database_path: config::database_path(),
            responses_dir: config::responses_dir(),
        }
    }

    /// Point the state at a different database file (tests).
    pub fn with_database_path(mut self, path: PathBuf) -> Self {
        self.database_path = path;
        self
    }

    /// Point the state at a different submissions directory (tests).
    pub fn with_responses_dir(mut self, dir: PathBuf) -> Self {
        self.responses_dir = dir;
        self
    }

    /// Load (or reload) the requirements database from disk. Returns
    /// whether a database file was found; a missing file is not an error,
    /// the service just starts degraded.
    pub fn load_database(&self) -> Result<bool, StateError> {
        match store::load_database(&self.database_path)? {
            Some(db) => {
                tracing::info!(
                    total = db.summary.total_requirements,
                    "Requirements database loaded"
                );
                let mut guard = self.database.write().map_err(|_| StateError::LockPoisoned)?;
                *guard = Some(Arc::new(db));
                Ok(true)
            }
            None => {
                tracing::warn!(
                    path = %self.database_path.display(),
                    "Requirements database not found, run the document processor first"
                );
                Ok(false)
            }
        }
    }

    /// Install an already-built database (tests, in-process extraction).
    pub fn set_database(&self, db: RequirementsDatabase) -> Result<(), StateError> {
        let mut guard = self.database.write().map_err(|_| StateError::LockPoisoned)?;
        *guard = Some(Arc::new(db));
        Ok(())
    }

    /// The loaded database, shared read-only.
    pub fn database(&self) -> Result<Option<Arc<RequirementsDatabase>>, StateError> {
        let guard = self.database.read().map_err(|_| StateError::LockPoisoned)?;
        Ok(guard.clone())
    }

    pub fn is_loaded(&self) -> bool {
        self.database
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Summary of the loaded database for the info and health endpoints.
    /// Zero counts and an "unknown" timestamp when nothing is loaded.
    pub fn requirements_info(&self) -> Result<RequirementsInfo, StateError> {
        let guard = self.database.read().map_err(|_| StateError::LockPoisoned)?;
        let Some(db) = guard.as_ref() else {
            return Ok(RequirementsInfo::default());
        };

        Ok(RequirementsInfo {
            total_requirements: db.summary.total_requirements,
            categories: CategoryCounts {
                general: db.general_requirements.len() as u64,
                size_specific: db.size_specific_requirements.len() as u64,
                capacity_specific: db.capacity_specific_requirements.len() as u64,
                feature_specific: db.feature_specific_requirements.len() as u64,
            },
            regulatory_authorities: db.document_analysis.regulatory_authorities.clone(),
            last_processed: db
                .processing_metadata
                .processed_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }
}

/// Database summary as exposed over the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequirementsInfo {
    pub total_requirements: u64,
    pub categories: CategoryCounts,
    pub regulatory_authorities: Vec<String>,
    pub last_processed: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CategoryCounts {
    pub general: u64,
    pub size_specific: u64,
    pub capacity_specific: u64,
    pub feature_specific: u64,
}

impl Default for RequirementsInfo {
    fn default() -> Self {
        Self {
            total_requirements: 0,
            categories: CategoryCounts::default(),
            regulatory_authorities: Vec::new(),
            last_processed: "unknown".to_string(),
        }
    }
}
