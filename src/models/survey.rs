use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::requirement::{Priority, Requirement, RequirementKind};

#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    #[error("business size must be a positive number of square meters (got {0})")]
    InvalidSize(f64),
    #[error("maximum occupancy must be at least 1 person")]
    InvalidOccupancy,
}

/// Answers to the business survey: the facts matching is based on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    /// Business area in square meters.
    pub size: f64,
    /// Maximum seating/occupancy.
    pub max_people: u32,
    pub uses_gas: bool,
    pub has_delivery: bool,
    pub serves_meat: bool,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl BusinessProfile {
    pub fn validate(&self) -> Result<(), ProfileError> {
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(ProfileError::InvalidSize(self.size));
        }
        if self.max_people == 0 {
            return Err(ProfileError::InvalidOccupancy);
        }
        Ok(())
    }
}

/// A requirement judged relevant to a profile, with the justification shown
/// to the business owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedRequirement {
    pub id: String,
    pub name: String,
    pub category: RequirementKind,
    pub authority: String,
    pub description: String,
    pub timeline: Option<String>,
    pub estimated_cost: Option<String>,
    pub priority: Priority,
    pub source_location: Option<String>,
    pub why_relevant: String,
}

impl MatchedRequirement {
    pub fn new(requirement: &Requirement, why_relevant: String) -> Self {
        MatchedRequirement {
            id: requirement.id.clone(),
            name: requirement.name.clone(),
            category: requirement.kind(),
            authority: requirement.authority.clone(),
            description: requirement.description.clone(),
            timeline: requirement.timeline.clone(),
            estimated_cost: requirement.estimated_cost.clone(),
            priority: requirement.priority,
            source_location: requirement.source_location.clone(),
            why_relevant,
        }
    }
}

/// Full answer to a survey submission.
#[derive(Debug, Clone, Serialize)]
pub struct SurveyReport {
    pub success: bool,
    pub survey_data: BusinessProfile,
    pub relevant_requirements: Vec<MatchedRequirement>,
    pub personalized_report: String,
    pub requirements_count: usize,
    pub estimated_total_cost: Option<String>,
    pub estimated_total_time: Option<String>,
    pub timestamp: DateTime<Utc>,
}
