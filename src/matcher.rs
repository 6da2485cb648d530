//! Relevance matching: which requirements apply to a given business.
//!
//! Pure and deterministic. The database is never mutated; each profile is
//! evaluated independently against the four sections in their canonical
//! order (general, size, capacity, feature), so match order is stable
//! across runs. A profile that matches nothing yields an empty list, not
//! an error.

use crate::models::{
    BusinessProfile, Category, FeatureConditions, MatchedRequirement, RequirementsDatabase,
};

/// Filter the database down to the requirements relevant to `profile`,
/// attaching a justification to each match.
pub fn match_requirements(
    profile: &BusinessProfile,
    db: &RequirementsDatabase,
) -> Vec<MatchedRequirement> {
    let mut matches = Vec::new();
    for (_, section) in db.sections() {
        for requirement in section {
            if let Some(why) = relevance(profile, &requirement.category) {
                matches.push(MatchedRequirement::new(requirement, why));
            }
        }
    }
    tracing::debug!(
        total = db.total_requirements(),
        matched = matches.len(),
        "Filtered requirements for business profile"
    );
    matches
}

/// Evaluate one requirement's conditions against the profile. Returns the
/// justification text when relevant, `None` otherwise.
fn relevance(profile: &BusinessProfile, category: &Category) -> Option<String> {
    match category {
        Category::General => Some("חובה על כל העסקים".to_string()),
        Category::Size(conditions) => {
            within(profile.size, conditions.min_size_sqm, conditions.max_size_sqm)
                .then(|| format!("חל על עסקים בגודל {} מ\"ר", profile.size))
        }
        Category::Capacity(conditions) => within(
            f64::from(profile.max_people),
            conditions.min_capacity,
            conditions.max_capacity,
        )
        .then(|| format!("חל על עסקים עם תפוסה של {} אנשים", profile.max_people)),
        Category::Feature(conditions) => {
            features_apply(profile, conditions).then(|| feature_justification(profile))
        }
    }
}

/// Bounds are inclusive; an unset bound is unconstrained.
fn within(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    if min.is_some_and(|min| value < min) {
        return false;
    }
    if max.is_some_and(|max| value > max) {
        return false;
    }
    true
}

/// Every set flag must equal the profile's flag exactly: `Some(true)`
/// excludes businesses without the feature, `Some(false)` excludes
/// businesses with it.
fn features_apply(profile: &BusinessProfile, conditions: &FeatureConditions) -> bool {
    flag_matches(conditions.requires_gas, profile.uses_gas)
        && flag_matches(conditions.has_delivery, profile.has_delivery)
        && flag_matches(conditions.serves_meat, profile.serves_meat)
}

fn flag_matches(condition: Option<bool>, actual: bool) -> bool {
    condition.map_or(true, |required| required == actual)
}

/// Name the profile's own features in the justification so the reader sees
/// which of their answers made the requirement apply.
fn feature_justification(profile: &BusinessProfile) -> String {
    let mut features = Vec::new();
    if profile.uses_gas {
        features.push("שימוש בגז");
    }
    if profile.has_delivery {
        features.push("משלוחים");
    }
    if profile.serves_meat {
        features.push("הגשת בשר");
    }
    if features.is_empty() {
        "רלוונטי למאפיינים מיוחדים".to_string()
    } else {
        format!("רלוונטי למאפיינים: {}", features.join(", "))
    }
}
