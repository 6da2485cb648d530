//! HTTP server lifecycle: bind, spawn, graceful shutdown.
//!
//! `start_server` binds the configured address, mounts `api_router()`,
//! and runs axum in a background task. The returned handle owns a
//! shutdown channel; dropping it without calling `shutdown` leaves the
//! server running until the process exits.

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::oneshot;

use crate::api::router::api_router;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to start API server on {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
}

/// Handle to the running API server.
pub struct ServerHandle {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ServerHandle {
    /// Shut down the server gracefully. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }
}

/// Start the API server on `addr` (host:port).
pub async fn start_server(state: Arc<AppState>, addr: &str) -> Result<ServerHandle, ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind {
            addr: addr.to_string(),
            source: e,
        })?;
    let local_addr = listener.local_addr().map_err(|e| ServerError::Bind {
        addr: addr.to_string(),
        source: e,
    })?;

    let app = api_router(state);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(addr = %local_addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ServerHandle {
        addr: local_addr,
        shutdown_tx: Some(shutdown_tx),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::new(None))
    }

    #[tokio::test]
    async fn start_and_stop_server() {
        let mut server = start_server(test_state(), "127.0.0.1:0")
            .await
            .expect("server should start");
        assert!(server.addr.port() > 0);

        let url = format!("http://{}/api/health", server.addr);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "degraded");

        server.shutdown();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn unknown_route_is_404_over_http() {
        let mut server = start_server(test_state(), "127.0.0.1:0")
            .await
            .expect("server should start");

        let url = format!("http://{}/nonexistent", server.addr);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

        server.shutdown();
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let mut server = start_server(test_state(), "127.0.0.1:0")
            .await
            .expect("server should start");
        server.shutdown();
        server.shutdown();
    }

    #[tokio::test]
    async fn bind_failure_is_reported() {
        let result = start_server(test_state(), "256.0.0.1:80").await;
        assert!(matches!(result, Err(ServerError::Bind { .. })));
    }
}
