//! Persistence: the processed requirements database and survey submission
//! archives. Both are plain JSON documents.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::wire::{FileDatabase, RawDatabase};
use crate::models::{BusinessProfile, MatchedRequirement, RequirementsDatabase};
use crate::pipeline::extract::validate;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed database file: {0}")]
    Malformed(String),
}

/// Write the database as pretty-printed UTF-8 JSON, creating parent
/// directories as needed.
pub fn save_database(db: &RequirementsDatabase, path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&FileDatabase::from_database(db))?;
    std::fs::write(path, json)?;
    tracing::info!(path = %path.display(), "Requirements database saved");
    Ok(())
}

/// Load a previously processed database. An absent file is a normal state
/// (no document processed yet) and returns `Ok(None)`; a file that exists
/// but cannot be read as a database is an error.
pub fn load_database(path: &Path) -> Result<Option<RequirementsDatabase>, StoreError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let raw: RawDatabase =
        serde_json::from_str(&content).map_err(|e| StoreError::Malformed(e.to_string()))?;
    Ok(Some(validate::build_database(raw)))
}

/// Archived copy of one survey submission, kept for product analytics.
/// Matches are stored whole, justifications included, so the archive stays
/// readable after the database is reprocessed and the ids change.
#[derive(Debug, Serialize)]
struct SubmissionRecord<'a> {
    submission_id: Uuid,
    submitted_at: DateTime<Utc>,
    survey: &'a BusinessProfile,
    matched_count: usize,
    matches: &'a [MatchedRequirement],
}

/// Archive a submission under `dir`. Best-effort: a submission that cannot
/// be archived is logged and forgotten, it never fails the survey answer.
pub fn save_survey_response(dir: &Path, profile: &BusinessProfile, matches: &[MatchedRequirement]) {
    let submission_id = Uuid::new_v4();
    let record = SubmissionRecord {
        submission_id,
        submitted_at: Utc::now(),
        survey: profile,
        matched_count: matches.len(),
        matches,
    };

    let short_id = submission_id.simple().to_string();
    let filename = format!(
        "survey_{}_{}.json",
        record.submitted_at.format("%Y%m%d_%H%M%S"),
        &short_id[..8]
    );

    let result = std::fs::create_dir_all(dir)
        .map_err(StoreError::from)
        .and_then(|()| Ok(serde_json::to_string_pretty(&record)?))
        .and_then(|json| Ok(std::fs::write(dir.join(&filename), json)?));

    match result {
        Ok(()) => tracing::debug!(file = %filename, "Survey submission archived"),
        Err(e) => tracing::warn!(error = %e, "Failed to archive survey submission"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::requirement::{
        Category, FeatureConditions, Priority, Requirement, SizeConditions,
    };
    use crate::models::{DocumentAnalysis, ProcessingMetadata};

    fn requirement(id: &str, category: Category) -> Requirement {
        Requirement {
            id: id.to_string(),
            name: format!("דרישה {id}"),
            authority: "משרד הבריאות".to_string(),
            description: "תיאור".to_string(),
            applies_to: None,
            timeline: Some("שבועיים".to_string()),
            estimated_cost: Some("1,000 ₪".to_string()),
            priority: Priority::High,
            source_location: Some("פרק 3".to_string()),
            additional_notes: None,
            category,
        }
    }

    fn database() -> RequirementsDatabase {
        let mut db = RequirementsDatabase {
            document_analysis: DocumentAnalysis {
                regulatory_authorities: vec!["משרד הבריאות".to_string()],
                extraction_confidence: Some("גבוהה".to_string()),
                ..Default::default()
            },
            general_requirements: vec![requirement("g1", Category::General)],
            size_specific_requirements: vec![requirement(
                "s1",
                Category::Size(SizeConditions {
                    min_size_sqm: Some(100.0),
                    max_size_sqm: Some(300.0),
                    size_notes: None,
                }),
            )],
            feature_specific_requirements: vec![requirement(
                "f1",
                Category::Feature(FeatureConditions {
                    requires_gas: Some(true),
                    ..Default::default()
                }),
            )],
            processing_metadata: ProcessingMetadata {
                processed_at: Some("2025-06-01T10:00:00Z".parse().unwrap()),
                processor_version: "0.1.0".to_string(),
                api_calls_used: 1,
                total_cost: 0.31,
            },
            ..Default::default()
        };
        db.recompute_summary();
        db
    }

    #[test]
    fn database_round_trips_through_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("processed").join("requirements.json");

        let db = database();
        save_database(&db, &path).unwrap();
        let loaded = load_database(&path).unwrap().unwrap();

        assert_eq!(loaded, db);
    }

    #[test]
    fn absent_file_is_not_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let loaded = load_database(&tmp.path().join("missing.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("requirements.json");
        std::fs::write(&path, "לא JSON בכלל").unwrap();
        assert!(matches!(
            load_database(&path),
            Err(StoreError::Malformed(_))
        ));
    }

    #[test]
    fn saved_file_keeps_section_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("requirements.json");
        save_database(&database(), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(value["general_requirements"].is_array());
        assert_eq!(value["general_requirements"][0]["category"], "general");
        assert!(value["general_requirements"][0].get("conditions").is_none());
        assert_eq!(
            value["size_specific_requirements"][0]["conditions"]["min_size_sqm"],
            100.0
        );
        assert_eq!(value["summary"]["total_requirements"], 3);
        assert_eq!(value["processing_metadata"]["api_calls_used"], 1);
    }

    #[test]
    fn survey_submission_archived_with_full_matches() {
        let tmp = tempfile::tempdir().unwrap();
        let profile = BusinessProfile {
            size: 100.0,
            max_people: 50,
            uses_gas: true,
            has_delivery: false,
            serves_meat: false,
            business_name: None,
            location: None,
        };
        let req = requirement("g1", Category::General);
        let matches = vec![MatchedRequirement::new(&req, "חובה על כל העסקים".to_string())];

        save_survey_response(tmp.path(), &profile, &matches);

        let entries: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let name = entries[0].as_ref().unwrap().file_name();
        assert!(name.to_string_lossy().starts_with("survey_"));

        let content = std::fs::read_to_string(entries[0].as_ref().unwrap().path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["matched_count"], 1);
        assert_eq!(value["matches"][0]["id"], "g1");
        assert_eq!(value["matches"][0]["name"], "דרישה g1");
        assert_eq!(value["matches"][0]["authority"], "משרד הבריאות");
        assert_eq!(value["matches"][0]["why_relevant"], "חובה על כל העסקים");
        assert_eq!(value["survey"]["max_people"], 50);
    }
}
