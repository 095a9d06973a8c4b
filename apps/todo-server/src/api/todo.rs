//! Todo task API endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use entities::TodoTask;
use serde::Deserialize;
use task_store::TaskStore;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Query parameters for listing tasks.
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    /// Maximum number of tasks to return.
    pub limit: Option<u32>,
}

/// Lists tasks.
pub async fn list_tasks<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ListTasksQuery>,
) -> ServerResult<Json<Vec<TodoTask>>> {
    let tasks = state.store.list_tasks(query.limit).await?;
    Ok(Json(tasks))
}

/// Gets a task by ID.
pub async fn get_task<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ServerResult<Json<TodoTask>> {
    let task = state
        .store
        .get_task(&id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("Task not found: {id}")))?;

    Ok(Json(task))
}

/// Creates a task. Any id in the request body is replaced.
pub async fn create_task<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(task): Json<TodoTask>,
) -> ServerResult<impl IntoResponse> {
    let task = state.store.create_task(task).await?;
    state.metrics.increment_tasks_created();

    tracing::info!(task_id = %task.id, "Task created");

    let location = format!("/todos/{}", task.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(task)))
}

/// Replaces a task. The id in the path wins over the id in the body.
pub async fn update_task<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(mut task): Json<TodoTask>,
) -> ServerResult<Json<TodoTask>> {
    task.id = id;

    let task = state.store.update_task(task).await?;
    if task.is_completed {
        state.metrics.increment_tasks_completed();
    }

    tracing::info!(task_id = %task.id, is_completed = task.is_completed, "Task updated");

    Ok(Json(task))
}

/// Deletes a task. Deleting a missing task succeeds.
pub async fn delete_task<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ServerResult<StatusCode> {
    if state.store.delete_task(&id).await? {
        state.metrics.increment_tasks_deleted();
        tracing::info!(task_id = %id, "Task deleted");
    }

    Ok(StatusCode::NO_CONTENT)
}
