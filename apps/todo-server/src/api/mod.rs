//! API endpoints.

pub mod health;
pub mod metrics;
pub mod todo;

use std::path::Path;
use std::sync::Arc;

use axum::{Router, routing::get};
use task_store::TaskStore;
use tower_http::services::{ServeDir, ServeFile};

use crate::state::AppState;

/// Creates the API router with all endpoints.
///
/// `/` serves `index.html` from `static_dir`; unmatched paths fall back to
/// the other files in that directory.
pub fn create_router<S: TaskStore + 'static>(static_dir: &Path) -> Router<Arc<AppState<S>>> {
    Router::new()
        // Todo endpoints
        .route("/todos", get(todo::list_tasks).post(todo::create_task))
        .route(
            "/todos/{id}",
            get(todo::get_task)
                .put(todo::update_task)
                .delete(todo::delete_task),
        )
        // Health check
        .route("/health", get(health::health_check))
        // Metrics exporter
        .route("/metrics", get(metrics::render_metrics))
        // Start page
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .fallback_service(ServeDir::new(static_dir))
}
