//! Metrics exporter endpoint.

use std::sync::Arc;

use axum::{extract::State, http::header, response::IntoResponse};
use task_store::TaskStore;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

const OPENMETRICS_CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

/// Renders all metrics in OpenMetrics text format.
pub async fn render_metrics<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServerResult<impl IntoResponse> {
    let body = state
        .metrics
        .encode()
        .map_err(|e| ServerError::Internal(format!("Failed to encode metrics: {e}")))?;

    Ok(([(header::CONTENT_TYPE, OPENMETRICS_CONTENT_TYPE)], body))
}
