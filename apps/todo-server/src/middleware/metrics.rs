//! Request metrics middleware.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use task_store::TaskStore;

use crate::state::AppState;

/// Counts each request and records its duration, labelled by method and
/// route template (`/todos/{id}` rather than the concrete path).
///
/// Installed as a route layer, so requests that fall through to the static
/// file fallback are not counted.
pub async fn track_request_metrics<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    matched_path: MatchedPath,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let endpoint = matched_path.as_str().to_owned();

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed().as_secs_f64();

    state.metrics.increment_requests(&method, &endpoint);
    state
        .metrics
        .record_request_duration(elapsed, &method, &endpoint);

    tracing::debug!(
        method = %method,
        endpoint = %endpoint,
        status = response.status().as_u16(),
        elapsed_ms = elapsed * 1000.0,
        "Request completed"
    );

    response
}
