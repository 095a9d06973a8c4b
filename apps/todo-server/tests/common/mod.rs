#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, header};
use entities::TodoTask;
use serde_json::Value;
use task_store::{TaskStore, TaskStoreError, TaskStoreResult};
use todo_server::config::Config;
use todo_server::services::metrics::Metrics;
use todo_server::state::create_shared_state;
use tower::ServiceExt;

/// Config pointing at the crate's bundled static directory.
pub fn test_config() -> Config {
    Config {
        static_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
        ..Config::default()
    }
}

/// Builds the app around `store` with its own metrics registry.
pub fn setup_app<S: TaskStore + 'static>(store: S) -> (Router, Arc<Metrics>) {
    setup_app_with_config(test_config(), store)
}

pub fn setup_app_with_config<S: TaskStore + 'static>(
    config: Config,
    store: S,
) -> (Router, Arc<Metrics>) {
    let metrics = Arc::new(Metrics::new());
    let state = create_shared_state(config, store, metrics.clone());
    (todo_server::create_app(state), metrics)
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

/// Store whose every call fails as if the backend were unreachable.
#[derive(Debug, Default)]
pub struct UnavailableTaskStore;

impl UnavailableTaskStore {
    fn fail<T>() -> TaskStoreResult<T> {
        Err(TaskStoreError::unavailable(
            "unavailable",
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
        ))
    }
}

#[async_trait]
impl TaskStore for UnavailableTaskStore {
    fn backend_name(&self) -> &'static str {
        "unavailable"
    }

    async fn list_tasks(&self, _limit: Option<u32>) -> TaskStoreResult<Vec<TodoTask>> {
        Self::fail()
    }

    async fn get_task(&self, _id: &str) -> TaskStoreResult<Option<TodoTask>> {
        Self::fail()
    }

    async fn create_task(&self, _task: TodoTask) -> TaskStoreResult<TodoTask> {
        Self::fail()
    }

    async fn update_task(&self, _task: TodoTask) -> TaskStoreResult<TodoTask> {
        Self::fail()
    }

    async fn delete_task(&self, _id: &str) -> TaskStoreResult<bool> {
        Self::fail()
    }

    async fn ping(&self) -> TaskStoreResult<()> {
        Self::fail()
    }
}
