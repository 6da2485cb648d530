//! Rishui turns a Hebrew regulatory licensing document into a structured
//! requirements database and answers business surveys with personalized
//! compliance reports.
//!
//! The extraction pipeline (normalize → prompt → parse → repair) runs as
//! an operator batch job (`process_document`); the serving process loads
//! the processed database read-only and exposes the survey/matching API.

pub mod api;
pub mod config;
pub mod matcher;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod state;
pub mod store;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::pipeline::llm::{ClaudeClient, CompletionClient};
use crate::state::AppState;

/// Initialize tracing from `RUST_LOG`, falling back to the built-in filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Run the serving process: build shared state, load the processed
/// database if one exists, start the HTTP API and wait for Ctrl-C.
pub async fn run() {
    init_tracing();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    // Without an API key the service still serves surveys, it just answers
    // them with the deterministic report.
    let narrative_client: Option<Arc<dyn CompletionClient>> =
        match ClaudeClient::from_env(config::NARRATIVE_MODEL) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Narrative model unavailable, reports will use the built-in template"
                );
                None
            }
        };

    let state = Arc::new(AppState::new(narrative_client));
    if let Err(e) = state.load_database() {
        tracing::error!(error = %e, "Requirements database failed to load, serving degraded");
    }

    let addr = config::bind_addr();
    let mut server = api::start_server(Arc::clone(&state), &addr)
        .await
        .expect("error while starting the API server");

    tokio::signal::ctrl_c()
        .await
        .expect("error while waiting for shutdown signal");

    let usage = state.usage.snapshot();
    tracing::info!(
        total_calls = usage.total_calls,
        total_cost_usd = usage.total_cost,
        "Final API usage"
    );
    server.shutdown();
}
