//! HTTP route table.
//!
//! Returns a composable `Router`: the service banner at `/`, everything
//! else nested under `/api/`. CORS is open to the local React dev servers
//! only.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::state::AppState;

/// Build the API router over shared state.
pub fn api_router(state: Arc<AppState>) -> Router {
    let ctx = ApiContext::new(state);

    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/health/detailed", get(endpoints::health::detailed))
        .route("/survey/submit", post(endpoints::survey::submit))
        .route("/requirements", get(endpoints::requirements::info))
        .route(
            "/requirements/categories",
            get(endpoints::requirements::categories),
        )
        .route(
            "/requirements/authorities",
            get(endpoints::requirements::authorities),
        )
        .route(
            "/requirements/search",
            get(endpoints::requirements::search),
        )
        .with_state(ctx.clone());

    Router::new()
        .route("/", get(endpoints::health::root))
        .with_state(ctx)
        .nest("/api", api)
        .fallback(unknown_route)
        .layer(cors_layer())
}

async fn unknown_route() -> ApiError {
    ApiError::NotFound
}

/// The frontend is a React dev server on localhost; nothing else needs
/// cross-origin access.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
            HeaderValue::from_static("http://localhost:3001"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}
