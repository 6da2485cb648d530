//! Read-only requirement browsing endpoints.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::wire::RawRequirement;
use crate::state::RequirementsInfo;

/// `GET /api/requirements` — database summary.
pub async fn info(State(ctx): State<ApiContext>) -> Result<Json<RequirementsInfo>, ApiError> {
    if !ctx.state.is_loaded() {
        return Err(ApiError::DatabaseNotReady);
    }
    Ok(Json(ctx.state.requirements_info()?))
}

#[derive(Serialize)]
pub struct CategoriesResponse {
    pub general_requirements: Vec<RawRequirement>,
    pub size_specific_requirements: Vec<RawRequirement>,
    pub capacity_specific_requirements: Vec<RawRequirement>,
    pub feature_specific_requirements: Vec<RawRequirement>,
}

/// `GET /api/requirements/categories` — the four sections in file form.
pub async fn categories(
    State(ctx): State<ApiContext>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let db = ctx.state.database()?.ok_or(ApiError::DatabaseNotReady)?;

    let to_wire = |reqs: &[crate::models::Requirement]| {
        reqs.iter().map(RawRequirement::from_requirement).collect()
    };

    Ok(Json(CategoriesResponse {
        general_requirements: to_wire(&db.general_requirements),
        size_specific_requirements: to_wire(&db.size_specific_requirements),
        capacity_specific_requirements: to_wire(&db.capacity_specific_requirements),
        feature_specific_requirements: to_wire(&db.feature_specific_requirements),
    }))
}

#[derive(Serialize)]
pub struct AuthoritiesResponse {
    pub authorities: Vec<String>,
    pub count: usize,
}

/// `GET /api/requirements/authorities` — regulatory authority list.
pub async fn authorities(
    State(ctx): State<ApiContext>,
) -> Result<Json<AuthoritiesResponse>, ApiError> {
    if !ctx.state.is_loaded() {
        return Err(ApiError::DatabaseNotReady);
    }
    let info = ctx.state.requirements_info()?;

    Ok(Json(AuthoritiesResponse {
        count: info.regulatory_authorities.len(),
        authorities: info.regulatory_authorities,
    }))
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub authority: Option<String>,
    pub category: Option<String>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub results: Vec<RawRequirement>,
    pub count: usize,
    pub filters: SearchParams,
}

/// `GET /api/requirements/search` — case-insensitive substring filters:
/// `query` over name and description, `authority` over the issuing body,
/// `category` over the section label (general/size/capacity/feature).
pub async fn search(
    State(ctx): State<ApiContext>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let db = ctx.state.database()?.ok_or(ApiError::DatabaseNotReady)?;

    let query = params.query.as_deref().map(str::to_lowercase);
    let authority = params.authority.as_deref().map(str::to_lowercase);
    let category = params.category.as_deref().map(str::to_lowercase);

    let mut results = Vec::new();
    for (kind, section) in db.sections() {
        if let Some(category) = &category {
            if !kind.as_str().contains(category.as_str()) {
                continue;
            }
        }
        for requirement in section {
            if let Some(authority) = &authority {
                if !requirement.authority.to_lowercase().contains(authority.as_str()) {
                    continue;
                }
            }
            if let Some(query) = &query {
                if !requirement.name.to_lowercase().contains(query.as_str())
                    && !requirement.description.to_lowercase().contains(query.as_str())
                {
                    continue;
                }
            }
            results.push(RawRequirement::from_requirement(requirement));
        }
    }

    Ok(Json(SearchResponse {
        count: results.len(),
        results,
        filters: params,
    }))
}
