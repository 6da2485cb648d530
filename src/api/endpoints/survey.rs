//! Survey submission: the matching-and-report flow.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::matcher;
use crate::models::{BusinessProfile, SurveyReport};
use crate::report::{self, ReportGenerator};
use crate::store;

/// `POST /api/survey/submit` — match the profile against the database and
/// return the personalized report.
///
/// 400 for an invalid profile, 503 while no database is loaded, 404 when
/// nothing matches. The submission archive is best-effort and never fails
/// the request.
pub async fn submit(
    State(ctx): State<ApiContext>,
    Json(profile): Json<BusinessProfile>,
) -> Result<Json<SurveyReport>, ApiError> {
    profile.validate()?;

    let db = ctx.state.database()?.ok_or(ApiError::DatabaseNotReady)?;

    let matches = matcher::match_requirements(&profile, &db);
    if matches.is_empty() {
        return Err(ApiError::NoMatches);
    }

    let generator = ReportGenerator::new(
        ctx.state.narrative_client.clone(),
        Arc::clone(&ctx.state.usage),
    );
    let personalized_report = generator.personalized_report(&profile, &matches).await;

    let estimated_total_cost = report::total_cost_estimate(&matches);
    let estimated_total_time = report::total_time_estimate(&matches);

    store::save_survey_response(&ctx.state.responses_dir, &profile, &matches);

    tracing::info!(
        matched = matches.len(),
        size = profile.size,
        max_people = profile.max_people,
        "Survey processed"
    );

    let requirements_count = matches.len();
    Ok(Json(SurveyReport {
        success: true,
        survey_data: profile,
        relevant_requirements: matches,
        personalized_report,
        requirements_count,
        estimated_total_cost: Some(estimated_total_cost),
        estimated_total_time: Some(estimated_total_time),
        timestamp: Utc::now(),
    }))
}
