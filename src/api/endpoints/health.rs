//! Health and service-info endpoints.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::config;
use crate::pipeline::llm::UsageSnapshot;
use crate::state::RequirementsInfo;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub database_loaded: bool,
    pub total_requirements: u64,
    pub ai_processor_ready: bool,
}

/// `GET /api/health` — liveness plus the two component flags.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    let database_loaded = ctx.state.is_loaded();
    let info = ctx.state.requirements_info()?;

    Ok(Json(HealthResponse {
        status: if database_loaded { "healthy" } else { "degraded" },
        timestamp: Utc::now(),
        database_loaded,
        total_requirements: info.total_requirements,
        ai_processor_ready: ctx.state.narrative_client.is_some(),
    }))
}

#[derive(Serialize)]
pub struct DetailedHealthResponse {
    pub timestamp: DateTime<Utc>,
    pub components: HealthComponents,
    pub overall_status: &'static str,
}

#[derive(Serialize)]
pub struct HealthComponents {
    pub database: ComponentHealth<RequirementsInfo>,
    pub ai_processor: ComponentHealth<AiProcessorDetails>,
}

#[derive(Serialize)]
pub struct ComponentHealth<T: Serialize> {
    pub status: &'static str,
    pub details: T,
}

#[derive(Serialize)]
pub struct AiProcessorDetails {
    pub initialized: bool,
    pub usage_tracker: UsageSnapshot,
}

/// `GET /api/health/detailed` — per-component status with the database
/// summary and the usage counters.
pub async fn detailed(
    State(ctx): State<ApiContext>,
) -> Result<Json<DetailedHealthResponse>, ApiError> {
    let database_loaded = ctx.state.is_loaded();
    let ai_ready = ctx.state.narrative_client.is_some();

    Ok(Json(DetailedHealthResponse {
        timestamp: Utc::now(),
        components: HealthComponents {
            database: ComponentHealth {
                status: if database_loaded { "healthy" } else { "unhealthy" },
                details: ctx.state.requirements_info()?,
            },
            ai_processor: ComponentHealth {
                status: if ai_ready { "healthy" } else { "unhealthy" },
                details: AiProcessorDetails {
                    initialized: ai_ready,
                    usage_tracker: ctx.state.usage.snapshot(),
                },
            },
        },
        overall_status: if database_loaded && ai_ready {
            "healthy"
        } else {
            "degraded"
        },
    }))
}

#[derive(Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub database: DatabaseInfo,
    pub ai_processor: AiProcessorInfo,
    pub endpoints: EndpointsInfo,
}

#[derive(Serialize)]
pub struct DatabaseInfo {
    pub loaded: bool,
    pub total_requirements: u64,
}

#[derive(Serialize)]
pub struct AiProcessorInfo {
    pub available: bool,
}

#[derive(Serialize)]
pub struct EndpointsInfo {
    pub health: &'static str,
    pub survey_submit: &'static str,
    pub requirements_info: &'static str,
}

/// `GET /` — service banner with the main endpoints.
pub async fn root(State(ctx): State<ApiContext>) -> Result<Json<ServiceInfo>, ApiError> {
    let info = ctx.state.requirements_info()?;

    Ok(Json(ServiceInfo {
        message: "Business Licensing API",
        version: config::APP_VERSION,
        status: "running",
        database: DatabaseInfo {
            loaded: ctx.state.is_loaded(),
            total_requirements: info.total_requirements,
        },
        ai_processor: AiProcessorInfo {
            available: ctx.state.narrative_client.is_some(),
        },
        endpoints: EndpointsInfo {
            health: "/api/health",
            survey_submit: "/api/survey/submit",
            requirements_info: "/api/requirements",
        },
    }))
}
