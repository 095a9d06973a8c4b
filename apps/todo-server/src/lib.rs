//! Todo Server
//!
//! HTTP API for creating, reading, updating and deleting todo tasks. Tasks live
//! in a pluggable [`TaskStore`]; the server also exports task and request
//! metrics and serves a static start page.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use task_store::TaskStore;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{Config, LogFormat};
use crate::services::metrics::Metrics;
use crate::state::{AppState, create_shared_state};

/// Creates the application router with all routes configured.
pub fn create_app<S: TaskStore + 'static>(state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    api::create_router(&state.config.static_dir)
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::metrics::track_request_metrics::<S>,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Creates the application state with the given configuration and store.
///
/// All states share the process-wide [`Metrics::global`] registry.
pub fn create_state<S: TaskStore>(config: Config, store: S) -> Arc<AppState<S>> {
    create_shared_state(config, store, Metrics::global())
}

/// Initializes tracing with the given log level and output format.
pub fn init_tracing(log_level: &str, log_format: LogFormat) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match log_format {
        LogFormat::Text => registry.with(fmt::layer()).init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }
}

/// Binds the configured address and serves the API until Ctrl-C.
pub async fn serve<S: TaskStore + 'static>(config: Config, store: S) -> anyhow::Result<()> {
    let addr: SocketAddr = config.server_addr().parse()?;

    let state = create_state(config, store);
    let app = create_app(state);

    tracing::info!(addr = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
