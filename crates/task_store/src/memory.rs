//! In-memory task store implementation for tests and local development.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use entities::TodoTask;
use tokio::sync::RwLock;

use crate::{TaskStore, TaskStoreError, TaskStoreResult, UpdatePolicy};

/// In-memory task store.
#[derive(Debug, Default, Clone)]
pub struct MemoryTaskStore {
    tasks: Arc<RwLock<HashMap<String, TodoTask>>>,
    update_policy: UpdatePolicy,
}

impl MemoryTaskStore {
    /// Creates a new, empty in-memory task store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the policy applied when updating a missing task.
    pub fn with_update_policy(mut self, update_policy: UpdatePolicy) -> Self {
        self.update_policy = update_policy;
        self
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn list_tasks(&self, limit: Option<u32>) -> TaskStoreResult<Vec<TodoTask>> {
        tracing::info!(limit = ?limit, "Listing tasks");
        let tasks = self.tasks.read().await;
        let limit = limit.map_or(usize::MAX, |l| l as usize);
        Ok(tasks.values().take(limit).cloned().collect())
    }

    async fn get_task(&self, id: &str) -> TaskStoreResult<Option<TodoTask>> {
        tracing::info!(task_id = %id, "Fetching task");
        let tasks = self.tasks.read().await;
        Ok(tasks.get(id).cloned())
    }

    async fn create_task(&self, mut task: TodoTask) -> TaskStoreResult<TodoTask> {
        task.assign_new_id();
        tracing::info!(task_id = %task.id, title = %task.title, "Creating task");
        let mut tasks = self.tasks.write().await;
        tasks.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    async fn update_task(&self, task: TodoTask) -> TaskStoreResult<TodoTask> {
        tracing::info!(task_id = %task.id, title = %task.title, "Updating task");
        let mut tasks = self.tasks.write().await;
        if self.update_policy == UpdatePolicy::Strict && !tasks.contains_key(&task.id) {
            tracing::warn!(task_id = %task.id, "Task to update does not exist");
            return Err(TaskStoreError::not_found(task.id));
        }
        tasks.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    async fn delete_task(&self, id: &str) -> TaskStoreResult<bool> {
        tracing::info!(task_id = %id, "Deleting task");
        let mut tasks = self.tasks.write().await;
        let removed = tasks.remove(id).is_some();
        if !removed {
            tracing::info!(task_id = %id, "Task to delete was already absent");
        }
        Ok(removed)
    }
}
