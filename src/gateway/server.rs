//! HTTP server setup
//!
//! Builds the axum router over the conversion handlers and serves it with
//! graceful shutdown on Ctrl+C.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::conversion::Codec;
use crate::gateway::handlers;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub codec: Arc<dyn Codec>,
}

impl AppState {
    pub fn new(codec: Arc<dyn Codec>) -> Self {
        Self { codec }
    }
}

/// Build the router with all middleware layers.
///
/// Bodies larger than `body_limit` bytes are refused with 413.
pub fn build_router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(handlers::discovery))
        .route("/health", get(handlers::health))
        .route("/encode", post(handlers::encode))
        .route("/decode", post(handlers::decode))
        .route("/encode-batch", post(handlers::encode_batch_items))
        .route("/encode-advanced", post(handlers::encode_advanced))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// HTTP server for the conversion gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    pub fn new(config: GatewayConfig, codec: Arc<dyn Codec>) -> Self {
        let router = build_router(AppState::new(codec), config.body_limit);
        Self { router, config }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            body_limit = self.config.body_limit,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(err) => {
            // Without a signal handler the server runs until killed
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
