//! Repair and convert the wire envelope into the canonical database.
//!
//! The model's bookkeeping (its own counts, its free-text category labels)
//! is never trusted: kinds come from the section a record sits in and the
//! summary is recomputed from the sequences.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::models::database::{ImportantInformation, RequirementsDatabase};
use crate::models::requirement::{Category, Priority, Requirement, RequirementKind};
use crate::models::wire::{RawDatabase, RawRequirement};

/// Build the canonical database from a parsed envelope.
///
/// Missing required sections are repaired to empty lists with a warning;
/// records that fail the structural schema are skipped with a warning.
/// `processing_metadata` is carried over when present (the extraction run
/// replaces it with fresh values afterwards).
pub fn build_database(raw: RawDatabase) -> RequirementsDatabase {
    if raw.document_analysis.is_none() {
        tracing::warn!(
            section = "document_analysis",
            "Reply is missing a required section, continuing with an empty analysis"
        );
    }
    let mut db = RequirementsDatabase {
        document_analysis: parse_block(raw.document_analysis, "document_analysis"),
        general_requirements: section(raw.general_requirements, RequirementKind::General),
        size_specific_requirements: section(raw.size_specific_requirements, RequirementKind::Size),
        capacity_specific_requirements: section(
            raw.capacity_specific_requirements,
            RequirementKind::Capacity,
        ),
        feature_specific_requirements: section(
            raw.feature_specific_requirements,
            RequirementKind::Feature,
        ),
        important_information: important_information(raw.important_information),
        processing_metadata: parse_block(raw.processing_metadata, "processing_metadata"),
        summary: Default::default(),
    };
    db.recompute_summary();
    db
}

/// Parse an optional sub-object, falling back to its default. A present
/// block with the wrong shape gets a warning; whether absence deserves one
/// is the caller's concern.
fn parse_block<T: DeserializeOwned + Default>(value: Option<Value>, block: &str) -> T {
    match value {
        None => T::default(),
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!(block, error = %e, "Malformed block in reply, using defaults");
            T::default()
        }),
    }
}

fn section(values: Option<Vec<Value>>, kind: RequirementKind) -> Vec<Requirement> {
    let Some(values) = values else {
        tracing::warn!(
            section = %kind,
            "Reply is missing a required section, continuing with an empty list"
        );
        return Vec::new();
    };
    values
        .into_iter()
        .filter_map(|value| convert_record(value, kind))
        .collect()
}

fn convert_record(value: Value, kind: RequirementKind) -> Option<Requirement> {
    let raw: RawRequirement = match serde_json::from_value(value) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(section = %kind, error = %e, "Skipping record without id/name");
            return None;
        }
    };

    let category = match kind {
        RequirementKind::General => Category::General,
        RequirementKind::Size => Category::Size(typed_conditions(raw.conditions, &raw.id)),
        RequirementKind::Capacity => Category::Capacity(typed_conditions(raw.conditions, &raw.id)),
        RequirementKind::Feature => Category::Feature(typed_conditions(raw.conditions, &raw.id)),
    };

    Some(Requirement {
        id: raw.id,
        name: raw.name,
        authority: raw.authority,
        description: raw.description,
        applies_to: raw.applies_to,
        timeline: raw.timeline,
        estimated_cost: raw.estimated_cost,
        priority: raw
            .priority
            .as_deref()
            .map(Priority::from_label)
            .unwrap_or_default(),
        source_location: raw.source_location,
        additional_notes: raw.additional_notes,
        category,
    })
}

/// Conditions that do not match their section's shape count as absent:
/// the requirement then applies to every profile, which for compliance is
/// the safe direction.
fn typed_conditions<C: DeserializeOwned + Default>(conditions: Option<Value>, id: &str) -> C {
    match conditions {
        None => C::default(),
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!(requirement = %id, error = %e, "Unreadable conditions, treating as unconstrained");
            C::default()
        }),
    }
}

fn important_information(values: Option<Vec<Value>>) -> Vec<ImportantInformation> {
    values
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping important_information entry without topic");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extract::parser::parse_reply;
    use serde_json::json;

    fn envelope() -> RawDatabase {
        let value = json!({
            "document_analysis": {
                "total_requirements_found": 99,
                "regulatory_authorities": ["משרד הבריאות", "כבאות והצלה"],
                "extraction_confidence": "גבוהה"
            },
            "general_requirements": [
                {
                    "id": "general_001",
                    "name": "רישיון עסק",
                    "category": "קטגוריה כללית",
                    "authority": "רשות מקומית",
                    "description": "הגשת בקשה לרישיון עסק",
                    "applies_to": "כל העסקים",
                    "priority": "גבוהה"
                }
            ],
            "size_specific_requirements": [
                {
                    "id": "size_001",
                    "name": "מערכת מתזים",
                    "authority": "כבאות והצלה",
                    "conditions": {"min_size_sqm": 100, "size_notes": "מעל 100 מ\"ר"},
                    "priority": "בינונית"
                }
            ],
            "capacity_specific_requirements": [
                {
                    "id": "capacity_001",
                    "name": "יציאות חירום",
                    "conditions": {"min_capacity": 50, "max_capacity": 500}
                }
            ],
            "feature_specific_requirements": [
                {
                    "id": "feature_001",
                    "name": "רישיון גז",
                    "conditions": {"requires_gas": true}
                }
            ],
            "important_information": [
                {"topic": "חידוש רישיון", "description": "אחת לשנה"}
            ]
        });
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn full_envelope_converts_with_kinds_from_sections() {
        let db = build_database(envelope());

        assert_eq!(db.general_requirements.len(), 1);
        assert_eq!(db.general_requirements[0].kind(), RequirementKind::General);
        assert_eq!(db.general_requirements[0].priority, Priority::High);

        let size = &db.size_specific_requirements[0];
        assert_eq!(size.kind(), RequirementKind::Size);
        match &size.category {
            Category::Size(c) => {
                assert_eq!(c.min_size_sqm, Some(100.0));
                assert_eq!(c.max_size_sqm, None);
            }
            other => panic!("wrong category: {other:?}"),
        }

        match &db.feature_specific_requirements[0].category {
            Category::Feature(c) => assert_eq!(c.requires_gas, Some(true)),
            other => panic!("wrong category: {other:?}"),
        }

        assert_eq!(db.important_information.len(), 1);
        assert_eq!(
            db.document_analysis.regulatory_authorities,
            vec!["משרד הבריאות", "כבאות והצלה"]
        );
    }

    #[test]
    fn summary_is_recomputed_not_trusted() {
        // document_analysis claims 99 requirements; the sequences hold 4.
        let db = build_database(envelope());
        assert_eq!(db.summary.total_requirements, 4);
        assert_eq!(db.summary.general_requirements_count, 1);
        assert_eq!(db.summary.feature_specific_count, 1);
    }

    #[test]
    fn missing_sections_repaired_to_empty() {
        let raw = parse_reply(r#"{"general_requirements": [{"id": "g1", "name": "א"}]}"#).unwrap();
        let db = build_database(raw);
        assert_eq!(db.general_requirements.len(), 1);
        assert!(db.size_specific_requirements.is_empty());
        assert!(db.capacity_specific_requirements.is_empty());
        assert!(db.feature_specific_requirements.is_empty());
        assert!(db.important_information.is_empty());
        assert_eq!(db.document_analysis, Default::default());
        assert_eq!(db.summary.total_requirements, 1);
    }

    #[test]
    fn records_without_id_or_name_are_skipped() {
        let raw = parse_reply(
            r#"{"general_requirements": [
                {"id": "g1", "name": "תקין"},
                {"id": "g2"},
                {"name": "חסר מזהה"},
                "not even an object"
            ]}"#,
        )
        .unwrap();
        let db = build_database(raw);
        assert_eq!(db.general_requirements.len(), 1);
        assert_eq!(db.general_requirements[0].id, "g1");
    }

    #[test]
    fn unreadable_conditions_become_unconstrained() {
        let raw = parse_reply(
            r#"{"size_specific_requirements": [
                {"id": "s1", "name": "דרישה", "conditions": {"min_size_sqm": "עד מאה"}}
            ]}"#,
        )
        .unwrap();
        let db = build_database(raw);
        assert_eq!(
            db.size_specific_requirements[0].category,
            Category::Size(Default::default())
        );
    }

    #[test]
    fn model_category_text_is_ignored() {
        // The record says "דרישות לפי גודל" but sits in the general section.
        let raw = parse_reply(
            r#"{"general_requirements": [
                {"id": "g1", "name": "דרישה", "category": "דרישות לפי גודל"}
            ]}"#,
        )
        .unwrap();
        let db = build_database(raw);
        assert_eq!(db.general_requirements[0].kind(), RequirementKind::General);
    }

    #[test]
    fn stored_metadata_is_preserved() {
        let raw = parse_reply(
            r#"{
                "general_requirements": [],
                "size_specific_requirements": [],
                "capacity_specific_requirements": [],
                "feature_specific_requirements": [],
                "processing_metadata": {
                    "processed_at": "2025-06-01T10:00:00Z",
                    "processor_version": "0.1.0",
                    "api_calls_used": 1,
                    "total_cost": 0.42
                }
            }"#,
        )
        .unwrap();
        let db = build_database(raw);
        assert_eq!(db.processing_metadata.api_calls_used, 1);
        assert_eq!(db.processing_metadata.total_cost, 0.42);
        assert!(db.processing_metadata.processed_at.is_some());
    }
}
