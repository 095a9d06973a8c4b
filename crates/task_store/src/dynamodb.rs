//! DynamoDB task store.
//!
//! [`DynamoDbTaskStore`] keeps one item per task in a single table whose
//! partition key is the string attribute `Id`:
//!
//! | Attribute     | Type        | Description                     |
//! |---------------|-------------|---------------------------------|
//! | `Id`          | String      | Task id (partition key)         |
//! | `Title`       | String      | Task title                      |
//! | `Description` | String      | Omitted when the task has none  |
//! | `IsCompleted` | Boolean     | Completion flag                 |
//!
//! Listing is a full paginated `Scan`; there is no secondary index and no
//! ordering guarantee.
//!
//! The adapter keeps the default no-op [`TaskStore::ping`], so a DynamoDB
//! outage shows up as `500` on the task routes while `/health` keeps
//! reporting healthy.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_dynamodb::{
    config::Region,
    error::DisplayErrorContext,
    types::{AttributeValue, ReturnValue},
    Client,
};
use entities::TodoTask;

use crate::{TaskStore, TaskStoreError, TaskStoreResult, UpdatePolicy};

const BACKEND: &str = "dynamodb";

const ATTR_ID: &str = "Id";
const ATTR_TITLE: &str = "Title";
const ATTR_DESCRIPTION: &str = "Description";
const ATTR_IS_COMPLETED: &str = "IsCompleted";

/// Default table name.
pub const DEFAULT_TABLE_NAME: &str = "Tasks";

/// Connection settings for [`DynamoDbTaskStore::connect`].
#[derive(Debug, Clone)]
pub struct DynamoDbConfig {
    /// Table holding the tasks.
    pub table_name: String,
    /// Region override. Falls back to the standard AWS config chain.
    pub region: Option<String>,
    /// Endpoint override, e.g. a local DynamoDB.
    pub endpoint_url: Option<String>,
    /// Per-operation timeout, including retries done by the SDK.
    pub timeout: Option<Duration>,
}

impl Default for DynamoDbConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            region: None,
            endpoint_url: None,
            timeout: None,
        }
    }
}

/// Task store backed by an Amazon DynamoDB table.
#[derive(Debug, Clone)]
pub struct DynamoDbTaskStore {
    client: Client,
    table_name: String,
    update_policy: UpdatePolicy,
}

impl DynamoDbTaskStore {
    /// Creates a store with a pre-built DynamoDB client.
    ///
    /// The table must already exist with `Id` (String) as its partition key.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
            update_policy: UpdatePolicy::default(),
        }
    }

    /// Creates a store from the standard AWS SDK config chain, applying the
    /// overrides in `config`.
    pub async fn connect(config: DynamoDbConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = config.region {
            loader = loader.region(Region::new(region));
        }
        if let Some(endpoint_url) = config.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        if let Some(timeout) = config.timeout {
            loader = loader.timeout_config(
                TimeoutConfig::builder().operation_timeout(timeout).build(),
            );
        }
        let sdk_config = loader.load().await;

        tracing::info!(table = %config.table_name, "Connected DynamoDB task store");
        Self::new(Client::new(&sdk_config), config.table_name)
    }

    /// Sets the policy applied when updating a missing task.
    pub fn with_update_policy(mut self, update_policy: UpdatePolicy) -> Self {
        self.update_policy = update_policy;
        self
    }
}

// ---------------------------------------------------------------------------
// Item conversion
// ---------------------------------------------------------------------------

/// Converts a task into a DynamoDB item.
fn task_to_item(task: &TodoTask) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::from([
        (ATTR_ID.to_string(), AttributeValue::S(task.id.clone())),
        (ATTR_TITLE.to_string(), AttributeValue::S(task.title.clone())),
        (
            ATTR_IS_COMPLETED.to_string(),
            AttributeValue::Bool(task.is_completed),
        ),
    ]);
    if let Some(description) = &task.description {
        item.insert(
            ATTR_DESCRIPTION.to_string(),
            AttributeValue::S(description.clone()),
        );
    }
    item
}

/// Reads the completion flag, stored either as BOOL or as N (`0`/`1`).
fn parse_completed(value: &AttributeValue) -> Option<bool> {
    match value {
        AttributeValue::Bool(b) => Some(*b),
        AttributeValue::N(n) => Some(n.trim() != "0"),
        _ => None,
    }
}

/// Converts a DynamoDB item back into a task.
fn item_to_task(item: &HashMap<String, AttributeValue>) -> TaskStoreResult<TodoTask> {
    let id = item
        .get(ATTR_ID)
        .and_then(|v| v.as_s().ok())
        .ok_or_else(|| TaskStoreError::malformed(BACKEND, "item has no string Id attribute"))?;

    Ok(TodoTask {
        id: id.clone(),
        title: item
            .get(ATTR_TITLE)
            .and_then(|v| v.as_s().ok())
            .cloned()
            .unwrap_or_default(),
        description: item
            .get(ATTR_DESCRIPTION)
            .and_then(|v| v.as_s().ok())
            .cloned(),
        is_completed: item
            .get(ATTR_IS_COMPLETED)
            .and_then(parse_completed)
            .unwrap_or(false),
    })
}

/// Maps an AWS SDK error to [`TaskStoreError::Unavailable`].
fn map_sdk_error<E>(err: E) -> TaskStoreError
where
    E: std::error::Error + Send + Sync + 'static,
{
    TaskStoreError::Unavailable {
        backend: BACKEND,
        message: DisplayErrorContext(&err).to_string(),
        source: Some(Box::new(err)),
    }
}

// ---------------------------------------------------------------------------
// TaskStore implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl TaskStore for DynamoDbTaskStore {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    async fn list_tasks(&self, limit: Option<u32>) -> TaskStoreResult<Vec<TodoTask>> {
        tracing::info!(table = %self.table_name, limit = ?limit, "Scanning tasks");

        let mut tasks = Vec::new();
        if limit == Some(0) {
            return Ok(tasks);
        }

        let mut exclusive_start_key = None;
        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_limit(limit.and_then(|l| i32::try_from(l).ok()))
                .set_exclusive_start_key(exclusive_start_key.take())
                .send()
                .await
                .map_err(map_sdk_error)
                .inspect_err(|e| tracing::error!(error = %e, "Failed to scan tasks"))?;

            for item in output.items() {
                let task = item_to_task(item)
                    .inspect_err(|e| tracing::error!(error = %e, "Malformed task item"))?;
                tasks.push(task);
                if limit.is_some_and(|l| tasks.len() >= l as usize) {
                    return Ok(tasks);
                }
            }

            match output.last_evaluated_key() {
                Some(key) if !key.is_empty() => exclusive_start_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(tasks)
    }

    async fn get_task(&self, id: &str) -> TaskStoreResult<Option<TodoTask>> {
        tracing::info!(task_id = %id, "Fetching task");

        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(ATTR_ID, AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(map_sdk_error)
            .inspect_err(|e| tracing::error!(task_id = %id, error = %e, "Failed to fetch task"))?;

        output
            .item()
            .map(item_to_task)
            .transpose()
            .inspect_err(|e| tracing::error!(task_id = %id, error = %e, "Malformed task item"))
    }

    async fn create_task(&self, mut task: TodoTask) -> TaskStoreResult<TodoTask> {
        task.assign_new_id();
        tracing::info!(task_id = %task.id, title = %task.title, "Creating task");

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(task_to_item(&task)))
            .send()
            .await
            .map_err(map_sdk_error)
            .inspect_err(|e| {
                tracing::error!(task_id = %task.id, title = %task.title, error = %e, "Failed to create task")
            })?;

        Ok(task)
    }

    async fn update_task(&self, task: TodoTask) -> TaskStoreResult<TodoTask> {
        tracing::info!(task_id = %task.id, title = %task.title, policy = %self.update_policy, "Updating task");

        let mut request = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(task_to_item(&task)));
        if self.update_policy == UpdatePolicy::Strict {
            request = request
                .condition_expression("attribute_exists(#id)")
                .expression_attribute_names("#id", ATTR_ID);
        }

        match request.send().await {
            Ok(_) => Ok(task),
            Err(sdk_err) => {
                if sdk_err
                    .as_service_error()
                    .is_some_and(|e| e.is_conditional_check_failed_exception())
                {
                    tracing::warn!(task_id = %task.id, "Task to update does not exist");
                    return Err(TaskStoreError::not_found(task.id));
                }
                let err = map_sdk_error(sdk_err);
                tracing::error!(task_id = %task.id, title = %task.title, error = %err, "Failed to update task");
                Err(err)
            }
        }
    }

    async fn delete_task(&self, id: &str) -> TaskStoreResult<bool> {
        tracing::info!(task_id = %id, "Deleting task");

        let output = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key(ATTR_ID, AttributeValue::S(id.to_string()))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(map_sdk_error)
            .inspect_err(|e| tracing::error!(task_id = %id, error = %e, "Failed to delete task"))?;

        let removed = output.attributes().is_some_and(|attrs| !attrs.is_empty());
        if !removed {
            tracing::info!(task_id = %id, "Task to delete was already absent");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_to_item_omits_missing_description() {
        let task = TodoTask::new("Buy milk").with_id("abc");
        let item = task_to_item(&task);

        assert_eq!(item.len(), 3);
        assert_eq!(item[ATTR_ID], AttributeValue::S("abc".to_string()));
        assert_eq!(item[ATTR_TITLE], AttributeValue::S("Buy milk".to_string()));
        assert_eq!(item[ATTR_IS_COMPLETED], AttributeValue::Bool(false));
        assert!(!item.contains_key(ATTR_DESCRIPTION));
    }

    #[test]
    fn test_item_round_trip_preserves_task() {
        let task = TodoTask::new("Buy milk")
            .with_description("Two liters")
            .with_completed(true);

        assert_eq!(item_to_task(&task_to_item(&task)).unwrap(), task);
    }

    #[test]
    fn test_item_with_numeric_completion_flag() {
        let item = HashMap::from([
            (ATTR_ID.to_string(), AttributeValue::S("abc".to_string())),
            (ATTR_TITLE.to_string(), AttributeValue::S("Buy milk".to_string())),
            (ATTR_IS_COMPLETED.to_string(), AttributeValue::N("1".to_string())),
        ]);

        assert!(item_to_task(&item).unwrap().is_completed);
    }

    #[test]
    fn test_item_with_only_id_uses_defaults() {
        let item = HashMap::from([(ATTR_ID.to_string(), AttributeValue::S("abc".to_string()))]);
        let task = item_to_task(&item).unwrap();

        assert_eq!(task, TodoTask::default().with_id("abc"));
    }

    #[test]
    fn test_item_without_id_is_malformed() {
        let item = HashMap::from([(
            ATTR_TITLE.to_string(),
            AttributeValue::S("Buy milk".to_string()),
        )]);

        let err = item_to_task(&item).unwrap_err();
        assert!(matches!(err, TaskStoreError::Unavailable { backend: "dynamodb", .. }));
    }

    #[test]
    fn test_default_config_uses_tasks_table() {
        let config = DynamoDbConfig::default();
        assert_eq!(config.table_name, "Tasks");
        assert!(config.region.is_none());
        assert!(config.timeout.is_none());
    }
}
