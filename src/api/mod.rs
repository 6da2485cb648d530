//! HTTP API layer.
//!
//! The service banner lives at `/`; health, survey and requirement
//! browsing routes are nested under `/api/`. The router is composable —
//! `api_router()` returns a `Router` that can be mounted on any axum
//! server instance.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_server, ServerError, ServerHandle};
pub use types::ApiContext;
