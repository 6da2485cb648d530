use serde::{Deserialize, Serialize};

/// Priority level attached to a requirement by the extraction model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Parse a model-supplied label. The extraction prompt asks for Hebrew
    /// labels; English labels are accepted for hand-edited files. Unknown
    /// labels fall back to Medium.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "גבוהה" | "high" => Priority::High,
            "נמוכה" | "low" => Priority::Low,
            "בינונית" | "medium" => Priority::Medium,
            _ => Priority::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// The four partitions of the requirements database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementKind {
    General,
    Size,
    Capacity,
    Feature,
}

impl RequirementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementKind::General => "general",
            RequirementKind::Size => "size",
            RequirementKind::Capacity => "capacity",
            RequirementKind::Feature => "feature",
        }
    }
}

impl std::fmt::Display for RequirementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Area bounds for size-specific requirements, in square meters.
/// Unset bounds are unconstrained.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeConditions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_size_sqm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size_sqm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_notes: Option<String>,
}

/// Occupancy bounds for capacity-specific requirements.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityConditions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_capacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_capacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_notes: Option<String>,
}

/// Feature flags for feature-specific requirements. `Some(true)` means the
/// requirement applies only to businesses with the feature, `Some(false)`
/// only to businesses without it, `None` does not discriminate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConditions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_gas: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_delivery: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serves_meat: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_notes: Option<String>,
}

/// Partition kind together with its kind-specific applicability conditions.
/// A requirement extracted without a conditions object gets the default
/// (unconstrained) conditions for its kind and matches every profile.
#[derive(Debug, Clone, PartialEq)]
pub enum Category {
    General,
    Size(SizeConditions),
    Capacity(CapacityConditions),
    Feature(FeatureConditions),
}

impl Category {
    pub fn kind(&self) -> RequirementKind {
        match self {
            Category::General => RequirementKind::General,
            Category::Size(_) => RequirementKind::Size,
            Category::Capacity(_) => RequirementKind::Capacity,
            Category::Feature(_) => RequirementKind::Feature,
        }
    }
}

/// One licensing requirement extracted from a regulatory document.
#[derive(Debug, Clone, PartialEq)]
pub struct Requirement {
    pub id: String,
    pub name: String,
    pub authority: String,
    pub description: String,
    pub applies_to: Option<String>,
    pub timeline: Option<String>,
    pub estimated_cost: Option<String>,
    pub priority: Priority,
    pub source_location: Option<String>,
    pub additional_notes: Option<String>,
    pub category: Category,
}

impl Requirement {
    pub fn kind(&self) -> RequirementKind {
        self.category.kind()
    }
}
