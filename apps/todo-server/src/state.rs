//! Application state.

use std::sync::Arc;
use std::time::Instant;

use task_store::TaskStore;

use crate::config::Config;
use crate::services::metrics::Metrics;

/// Shared application state.
pub struct AppState<S: TaskStore> {
    /// Server configuration.
    pub config: Config,
    /// Task store.
    pub store: S,
    /// Task and request metrics.
    pub metrics: Arc<Metrics>,
    /// When the server state was created.
    pub started_at: Instant,
}

impl<S: TaskStore> AppState<S> {
    /// Creates new application state.
    pub fn new(config: Config, store: S, metrics: Arc<Metrics>) -> Self {
        Self {
            config,
            store,
            metrics,
            started_at: Instant::now(),
        }
    }
}

/// Type alias for shared state.
pub type SharedState<S> = Arc<AppState<S>>;

/// Creates shared state from config, store and metrics.
pub fn create_shared_state<S: TaskStore>(
    config: Config,
    store: S,
    metrics: Arc<Metrics>,
) -> SharedState<S> {
    Arc::new(AppState::new(config, store, metrics))
}
