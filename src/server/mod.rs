// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// HTTP surface over the pipeline

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ServerError, ServerResult};
pub use state::AppState;

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, ServerConfig};
use middleware::log_requests;

/// Build the Axum router with all routes and middleware
pub fn build_router(state: Arc<AppState>) -> Router {
    let server = &state.config.server;

    // CORS layer
    let cors = if server.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/", get(routes::api_info))
        .route("/health", get(routes::health))
        .route("/upload", post(routes::upload))
        .route("/mask", post(routes::mask))
        .route("/suggest", post(routes::suggest))
        .route("/download/{reference}", get(routes::download))
        .fallback(routes::not_found)
        .layer(DefaultBodyLimit::max(server.max_upload_bytes()))
        .layer(cors)
        .layer(from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Install the global tracing subscriber
pub fn init_tracing(config: &ServerConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if config.log_json {
        builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?;
    } else {
        builder.try_init().map_err(|e| anyhow::anyhow!(e))?;
    }
    Ok(())
}

/// Start the HTTP server and block until SIGTERM or Ctrl+C
pub async fn start_server(config: AppConfig) -> anyhow::Result<()> {
    init_tracing(&config.server)?;

    let addr: SocketAddr = config.server.socket_addr()?;
    let max_upload_mb = config.server.max_upload_mb;
    let enable_cors = config.server.enable_cors;

    // The recognizer is compiled once here and shared by every request
    let state = Arc::new(AppState::from_config(config)?);
    let app = build_router(state);

    tracing::info!(%addr, max_upload_mb, enable_cors, "Starting PII masker server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
