use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::requirement::{Requirement, RequirementKind};

/// Document-level observations reported by the extraction model.
/// Informational only; counts in here are never trusted for bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DocumentAnalysis {
    #[serde(default)]
    pub total_requirements_found: Option<u64>,
    #[serde(default)]
    pub document_sections: Vec<String>,
    #[serde(default)]
    pub regulatory_authorities: Vec<String>,
    #[serde(default)]
    pub processing_notes: Option<String>,
    #[serde(default)]
    pub document_length: Option<u64>,
    #[serde(default)]
    pub extraction_confidence: Option<String>,
}

/// A noteworthy fact from the document that is not itself a requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportantInformation {
    pub topic: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub relevance: Option<String>,
    #[serde(default)]
    pub source_location: Option<String>,
}

/// Provenance of an extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProcessingMetadata {
    #[serde(default)]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub processor_version: String,
    #[serde(default)]
    pub api_calls_used: u64,
    #[serde(default)]
    pub total_cost: f64,
}

/// Per-kind requirement counts, always derived from the actual sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RequirementsSummary {
    pub total_requirements: u64,
    pub general_requirements_count: u64,
    pub size_specific_count: u64,
    pub capacity_specific_count: u64,
    pub feature_specific_count: u64,
}

/// Everything extracted from one regulatory document: four kind-partitioned
/// requirement sequences plus document-level metadata. Section order is
/// fixed: general, size, capacity, feature.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequirementsDatabase {
    pub document_analysis: DocumentAnalysis,
    pub general_requirements: Vec<Requirement>,
    pub size_specific_requirements: Vec<Requirement>,
    pub capacity_specific_requirements: Vec<Requirement>,
    pub feature_specific_requirements: Vec<Requirement>,
    pub important_information: Vec<ImportantInformation>,
    pub processing_metadata: ProcessingMetadata,
    pub summary: RequirementsSummary,
}

impl RequirementsDatabase {
    /// The four sections in canonical matching/reporting order.
    pub fn sections(&self) -> [(RequirementKind, &[Requirement]); 4] {
        [
            (RequirementKind::General, &self.general_requirements),
            (RequirementKind::Size, &self.size_specific_requirements),
            (RequirementKind::Capacity, &self.capacity_specific_requirements),
            (RequirementKind::Feature, &self.feature_specific_requirements),
        ]
    }

    pub fn total_requirements(&self) -> u64 {
        (self.general_requirements.len()
            + self.size_specific_requirements.len()
            + self.capacity_specific_requirements.len()
            + self.feature_specific_requirements.len()) as u64
    }

    /// Recompute the summary block from the sequences themselves.
    pub fn recompute_summary(&mut self) {
        self.summary = RequirementsSummary {
            total_requirements: self.total_requirements(),
            general_requirements_count: self.general_requirements.len() as u64,
            size_specific_count: self.size_specific_requirements.len() as u64,
            capacity_specific_count: self.capacity_specific_requirements.len() as u64,
            feature_specific_count: self.feature_specific_requirements.len() as u64,
        };
    }
}
