//! Health check endpoint.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use task_store::TaskStore;

use crate::state::AppState;

/// Body of a successful health check.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
    pub store: &'static str,
    pub uptime_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Reports service health, probing the task store.
///
/// Store failures degrade to `503` with an `unhealthy` body instead of the
/// generic error response.
pub async fn health_check<S: TaskStore>(State(state): State<Arc<AppState<S>>>) -> Response {
    if let Err(e) = state.store.ping().await {
        tracing::error!(backend = state.store.backend_name(), error = %e, "Health check failed");
        let body = json!({
            "status": "unhealthy",
            "error": e.to_string(),
            "timestamp": Utc::now(),
        });
        return (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response();
    }

    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
        store: state.store.backend_name(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        environment: state.config.environment.clone(),
        region: state.config.aws_region.clone(),
    })
    .into_response()
}
