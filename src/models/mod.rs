//! Domain types: requirements, the extracted database, survey profiles,
//! and the shared JSON wire schema.

pub mod database;
pub mod requirement;
pub mod survey;
pub mod wire;

pub use database::{
    DocumentAnalysis, ImportantInformation, ProcessingMetadata, RequirementsDatabase,
    RequirementsSummary,
};
pub use requirement::{
    CapacityConditions, Category, FeatureConditions, Priority, Requirement, RequirementKind,
    SizeConditions,
};
pub use survey::{BusinessProfile, MatchedRequirement, ProfileError, SurveyReport};
