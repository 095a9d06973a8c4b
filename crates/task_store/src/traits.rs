//! Task store trait definitions.

use std::{fmt, str::FromStr};

use async_trait::async_trait;
use entities::TodoTask;
use serde::{Deserialize, Serialize};

use crate::TaskStoreResult;

/// What `update_task` does when no task has the given id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePolicy {
    /// Create the task.
    #[default]
    Upsert,
    /// Fail with [`TaskStoreError::NotFound`](crate::TaskStoreError::NotFound)
    /// and write nothing.
    Strict,
}

impl UpdatePolicy {
    /// Converts the policy to its configuration string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upsert => "upsert",
            Self::Strict => "strict",
        }
    }
}

impl fmt::Display for UpdatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpdatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "upsert" => Ok(Self::Upsert),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown update policy: {other}")),
        }
    }
}

/// Trait for task storage operations.
///
/// Implementations hold no request-scoped state and are shared across all
/// concurrently running handlers.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Short backend identifier used in logs and health reports.
    fn backend_name(&self) -> &'static str;

    /// Lists tasks in backend order, capped at `limit` when given.
    async fn list_tasks(&self, limit: Option<u32>) -> TaskStoreResult<Vec<TodoTask>>;

    /// Gets a task by ID.
    async fn get_task(&self, id: &str) -> TaskStoreResult<Option<TodoTask>>;

    /// Stores a new task under a freshly generated id and returns it.
    ///
    /// Any id already set on `task` is discarded.
    async fn create_task(&self, task: TodoTask) -> TaskStoreResult<TodoTask>;

    /// Replaces the task with the same id.
    ///
    /// A missing task is handled according to the store's [`UpdatePolicy`].
    async fn update_task(&self, task: TodoTask) -> TaskStoreResult<TodoTask>;

    /// Deletes a task. Returns whether a task was actually removed.
    async fn delete_task(&self, id: &str) -> TaskStoreResult<bool>;

    /// Checks that the backing store is reachable.
    async fn ping(&self) -> TaskStoreResult<()> {
        Ok(())
    }
}
