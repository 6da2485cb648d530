//! JSON wire schema for the requirements database.
//!
//! The extraction model's reply and the persisted database file share this
//! shape by design: processing writes the validated reply straight to disk
//! and the serving side reads the same document back. Incoming records are
//! tolerant (`RawDatabase`, every field defaulted); outgoing records are
//! always fully populated (`FileDatabase`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::database::{
    DocumentAnalysis, ImportantInformation, ProcessingMetadata, RequirementsDatabase,
    RequirementsSummary,
};
use super::requirement::{Category, Requirement};

/// Top-level envelope as received from the model or read from disk.
/// Sections are `Option` so a missing section can be told apart from an
/// empty one and repaired with a warning.
#[derive(Debug, Default, Deserialize)]
pub struct RawDatabase {
    #[serde(default)]
    pub document_analysis: Option<Value>,
    #[serde(default)]
    pub general_requirements: Option<Vec<Value>>,
    #[serde(default)]
    pub size_specific_requirements: Option<Vec<Value>>,
    #[serde(default)]
    pub capacity_specific_requirements: Option<Vec<Value>>,
    #[serde(default)]
    pub feature_specific_requirements: Option<Vec<Value>>,
    #[serde(default)]
    pub important_information: Option<Vec<Value>>,
    #[serde(default)]
    pub processing_metadata: Option<Value>,
    /// Present in persisted files; ignored on read (always recomputed).
    #[serde(default)]
    pub summary: Option<Value>,
}

/// One requirement record on the wire. Only `id` and `name` are structural;
/// everything else defaults. `conditions` stays untyped here because its
/// shape depends on which section the record sits in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRequirement {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub authority: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applies_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Value>,
}

impl RawRequirement {
    /// Wire form of a canonical requirement. The `category` field is written
    /// as the partition label for human readers; loading ignores it because
    /// the section a record sits in is authoritative.
    pub fn from_requirement(req: &Requirement) -> Self {
        let conditions = match &req.category {
            Category::General => None,
            Category::Size(c) => serde_json::to_value(c).ok(),
            Category::Capacity(c) => serde_json::to_value(c).ok(),
            Category::Feature(c) => serde_json::to_value(c).ok(),
        };
        RawRequirement {
            id: req.id.clone(),
            name: req.name.clone(),
            category: Some(req.kind().as_str().to_string()),
            authority: req.authority.clone(),
            description: req.description.clone(),
            applies_to: req.applies_to.clone(),
            timeline: req.timeline.clone(),
            estimated_cost: req.estimated_cost.clone(),
            priority: Some(req.priority.as_str().to_string()),
            source_location: req.source_location.clone(),
            additional_notes: req.additional_notes.clone(),
            conditions,
        }
    }
}

/// Fully populated envelope as written to disk.
#[derive(Debug, Serialize)]
pub struct FileDatabase {
    pub document_analysis: DocumentAnalysis,
    pub general_requirements: Vec<RawRequirement>,
    pub size_specific_requirements: Vec<RawRequirement>,
    pub capacity_specific_requirements: Vec<RawRequirement>,
    pub feature_specific_requirements: Vec<RawRequirement>,
    pub important_information: Vec<ImportantInformation>,
    pub processing_metadata: ProcessingMetadata,
    pub summary: RequirementsSummary,
}

impl FileDatabase {
    pub fn from_database(db: &RequirementsDatabase) -> Self {
        let records = |reqs: &[Requirement]| {
            reqs.iter()
                .map(RawRequirement::from_requirement)
                .collect::<Vec<_>>()
        };
        FileDatabase {
            document_analysis: db.document_analysis.clone(),
            general_requirements: records(&db.general_requirements),
            size_specific_requirements: records(&db.size_specific_requirements),
            capacity_specific_requirements: records(&db.capacity_specific_requirements),
            feature_specific_requirements: records(&db.feature_specific_requirements),
            important_information: db.important_information.clone(),
            processing_metadata: db.processing_metadata.clone(),
            summary: db.summary.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::requirement::{Priority, SizeConditions};

    fn size_requirement() -> Requirement {
        Requirement {
            id: "size-001".to_string(),
            name: "מערכת כיבוי אש".to_string(),
            authority: "כבאות והצלה".to_string(),
            description: "נדרשת מערכת מתזים".to_string(),
            applies_to: None,
            timeline: Some("4-6 שבועות".to_string()),
            estimated_cost: Some("5,000-15,000 ₪".to_string()),
            priority: Priority::High,
            source_location: Some("פרק 5".to_string()),
            additional_notes: None,
            category: Category::Size(SizeConditions {
                min_size_sqm: Some(100.0),
                max_size_sqm: None,
                size_notes: Some("מעל 100 מ\"ר".to_string()),
            }),
        }
    }

    #[test]
    fn wire_record_carries_kind_label_and_conditions() {
        let raw = RawRequirement::from_requirement(&size_requirement());
        assert_eq!(raw.category.as_deref(), Some("size"));
        assert_eq!(raw.priority.as_deref(), Some("high"));
        let conditions = raw.conditions.unwrap();
        assert_eq!(conditions["min_size_sqm"], 100.0);
        assert!(conditions.get("max_size_sqm").is_none());
    }

    #[test]
    fn general_record_has_no_conditions_key() {
        let mut req = size_requirement();
        req.category = Category::General;
        let json = serde_json::to_value(RawRequirement::from_requirement(&req)).unwrap();
        assert!(json.get("conditions").is_none());
        assert_eq!(json["category"], "general");
    }

    #[test]
    fn raw_requirement_tolerates_minimal_records() {
        let raw: RawRequirement =
            serde_json::from_value(serde_json::json!({ "id": "g1", "name": "רישיון עסק" }))
                .unwrap();
        assert_eq!(raw.id, "g1");
        assert_eq!(raw.authority, "");
        assert!(raw.conditions.is_none());
    }

    #[test]
    fn raw_requirement_requires_id_and_name() {
        let missing_name = serde_json::json!({ "id": "g1" });
        assert!(serde_json::from_value::<RawRequirement>(missing_name).is_err());
    }

    #[test]
    fn raw_database_tolerates_missing_sections() {
        let raw: RawDatabase = serde_json::from_str("{}").unwrap();
        assert!(raw.general_requirements.is_none());
        assert!(raw.document_analysis.is_none());
    }
}
