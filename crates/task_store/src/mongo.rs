//! MongoDB task store.
//!
//! Each task is one document keyed by its string id in `_id`. Field names are
//! PascalCase (`Title`, `Description`, `IsCompleted`) and unknown fields are
//! ignored on read.

use std::time::Duration;

use async_trait::async_trait;
use entities::TodoTask;
use futures_util::TryStreamExt;
use mongodb::{bson::doc, options::ClientOptions, Client, Collection, Database};
use serde::{Deserialize, Serialize};

use crate::{TaskStore, TaskStoreError, TaskStoreResult, UpdatePolicy};

const BACKEND: &str = "mongodb";

/// Number of tasks returned by [`TaskStore::list_tasks`] when no limit is given.
pub const DEFAULT_LIST_LIMIT: u32 = 100;

/// Connection settings for [`MongoTaskStore::connect`].
#[derive(Debug, Clone)]
pub struct MongoConfig {
    /// Connection string.
    pub uri: String,
    /// Database name.
    pub database: String,
    /// Collection holding the tasks.
    pub collection: String,
    /// Connect and server selection timeout.
    pub timeout: Option<Duration>,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "todoapp".to_string(),
            collection: "tasks".to_string(),
            timeout: None,
        }
    }
}

/// Stored representation of a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TaskDocument {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    is_completed: bool,
}

impl From<TodoTask> for TaskDocument {
    fn from(task: TodoTask) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            is_completed: task.is_completed,
        }
    }
}

impl From<TaskDocument> for TodoTask {
    fn from(document: TaskDocument) -> Self {
        Self {
            id: document.id,
            title: document.title,
            description: document.description,
            is_completed: document.is_completed,
        }
    }
}

/// Task store backed by a MongoDB collection.
#[derive(Debug, Clone)]
pub struct MongoTaskStore {
    database: Database,
    collection: Collection<TaskDocument>,
    update_policy: UpdatePolicy,
}

impl MongoTaskStore {
    /// Builds a client from `config` and binds the store to its collection.
    ///
    /// The driver connects lazily; use [`TaskStore::ping`] to verify the
    /// server is reachable.
    pub async fn connect(config: MongoConfig) -> TaskStoreResult<Self> {
        let mut options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|e| TaskStoreError::unavailable(BACKEND, e))?;
        options.app_name = Some("todo-server".to_string());
        if let Some(timeout) = config.timeout {
            options.connect_timeout = Some(timeout);
            options.server_selection_timeout = Some(timeout);
        }

        let client =
            Client::with_options(options).map_err(|e| TaskStoreError::unavailable(BACKEND, e))?;
        let database = client.database(&config.database);
        let collection = database.collection::<TaskDocument>(&config.collection);

        tracing::info!(
            database = %config.database,
            collection = %config.collection,
            "Connected MongoDB task store"
        );

        Ok(Self {
            database,
            collection,
            update_policy: UpdatePolicy::default(),
        })
    }

    /// Sets the policy applied when updating a missing task.
    pub fn with_update_policy(mut self, update_policy: UpdatePolicy) -> Self {
        self.update_policy = update_policy;
        self
    }
}

#[async_trait]
impl TaskStore for MongoTaskStore {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    async fn list_tasks(&self, limit: Option<u32>) -> TaskStoreResult<Vec<TodoTask>> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT);
        tracing::info!(limit, "Listing tasks");
        if limit == 0 {
            return Ok(Vec::new());
        }

        let documents: Vec<TaskDocument> = async {
            self.collection
                .find(doc! {})
                .limit(i64::from(limit))
                .await?
                .try_collect()
                .await
        }
        .await
        .map_err(|e| TaskStoreError::unavailable(BACKEND, e))
        .inspect_err(|e| tracing::error!(error = %e, "Failed to list tasks"))?;

        Ok(documents.into_iter().map(TodoTask::from).collect())
    }

    async fn get_task(&self, id: &str) -> TaskStoreResult<Option<TodoTask>> {
        tracing::info!(task_id = %id, "Fetching task");

        let document = self
            .collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| TaskStoreError::unavailable(BACKEND, e))
            .inspect_err(|e| tracing::error!(task_id = %id, error = %e, "Failed to fetch task"))?;

        Ok(document.map(TodoTask::from))
    }

    async fn create_task(&self, mut task: TodoTask) -> TaskStoreResult<TodoTask> {
        task.assign_new_id();
        tracing::info!(task_id = %task.id, title = %task.title, "Creating task");

        let document = TaskDocument::from(task.clone());
        self.collection
            .insert_one(&document)
            .await
            .map_err(|e| TaskStoreError::unavailable(BACKEND, e))
            .inspect_err(|e| {
                tracing::error!(task_id = %task.id, title = %task.title, error = %e, "Failed to create task")
            })?;

        Ok(task)
    }

    async fn update_task(&self, task: TodoTask) -> TaskStoreResult<TodoTask> {
        tracing::info!(task_id = %task.id, title = %task.title, policy = %self.update_policy, "Updating task");

        let document = TaskDocument::from(task.clone());
        let result = self
            .collection
            .replace_one(doc! { "_id": task.id.as_str() }, &document)
            .upsert(self.update_policy == UpdatePolicy::Upsert)
            .await
            .map_err(|e| TaskStoreError::unavailable(BACKEND, e))
            .inspect_err(|e| {
                tracing::error!(task_id = %task.id, title = %task.title, error = %e, "Failed to update task")
            })?;

        if self.update_policy == UpdatePolicy::Strict && result.matched_count == 0 {
            tracing::warn!(task_id = %task.id, "Task to update does not exist");
            return Err(TaskStoreError::not_found(task.id));
        }

        Ok(task)
    }

    async fn delete_task(&self, id: &str) -> TaskStoreResult<bool> {
        tracing::info!(task_id = %id, "Deleting task");

        let result = self
            .collection
            .delete_one(doc! { "_id": id })
            .await
            .map_err(|e| TaskStoreError::unavailable(BACKEND, e))
            .inspect_err(|e| tracing::error!(task_id = %id, error = %e, "Failed to delete task"))?;

        let removed = result.deleted_count > 0;
        if !removed {
            tracing::info!(task_id = %id, "Task to delete was already absent");
        }
        Ok(removed)
    }

    async fn ping(&self) -> TaskStoreResult<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| TaskStoreError::unavailable(BACKEND, e))
            .inspect_err(|e| tracing::error!(error = %e, "Failed to ping MongoDB"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mongodb::bson::{from_document, to_document};

    use super::*;

    #[test]
    fn test_document_uses_string_id_and_pascal_case() {
        let task = TodoTask::new("Buy milk").with_id("abc").with_completed(true);
        let document = to_document(&TaskDocument::from(task)).unwrap();

        assert_eq!(document.get_str("_id").unwrap(), "abc");
        assert_eq!(document.get_str("Title").unwrap(), "Buy milk");
        assert!(document.get_bool("IsCompleted").unwrap());
        assert!(!document.contains_key("Description"));
    }

    #[test]
    fn test_document_round_trip_preserves_task() {
        let task = TodoTask::new("Buy milk").with_description("Two liters");
        let document = to_document(&TaskDocument::from(task.clone())).unwrap();
        let restored: TaskDocument = from_document(document).unwrap();

        assert_eq!(TodoTask::from(restored), task);
    }

    #[test]
    fn test_document_ignores_extra_fields_and_defaults_missing_ones() {
        let restored: TaskDocument = from_document(doc! {
            "_id": "abc",
            "Priority": 3,
        })
        .unwrap();

        assert_eq!(TodoTask::from(restored), TodoTask::default().with_id("abc"));
    }

    #[test]
    fn test_default_config() {
        let config = MongoConfig::default();
        assert_eq!(config.database, "todoapp");
        assert_eq!(config.collection, "tasks");
        assert_eq!(DEFAULT_LIST_LIMIT, 100);
    }

    #[tokio::test]
    async fn test_ping_unreachable_server_is_unavailable() {
        let store = MongoTaskStore::connect(MongoConfig {
            uri: "mongodb://127.0.0.1:1".to_string(),
            timeout: Some(Duration::from_millis(200)),
            ..MongoConfig::default()
        })
        .await
        .unwrap();

        let err = store.ping().await.unwrap_err();
        assert!(matches!(
            err,
            TaskStoreError::Unavailable {
                backend: "mongodb",
                ..
            }
        ));
    }
}
