//! Todo task entity definitions.

use std::fmt;

use serde::{
    Deserialize, Deserializer, Serialize,
    de::{IgnoredAny, MapAccess, Visitor},
};
use uuid::Uuid;

/// Generates a fresh task identifier.
pub fn generate_task_id() -> String {
    Uuid::new_v4().to_string()
}

/// A single todo task.
///
/// Every field is optional on the wire; missing fields take their defaults,
/// so `{"title": "Buy milk"}` deserializes into an incomplete task with no
/// description and an empty id. Only JSON objects are accepted; a sequence
/// is rejected rather than read positionally.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoTask {
    /// Unique identifier, assigned by the store on creation.
    pub id: String,
    /// Task title. May be empty.
    pub title: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Whether the task has been completed.
    pub is_completed: bool,
}

impl TodoTask {
    /// Creates a new, incomplete task with a fresh id.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: generate_task_id(),
            title: title.into(),
            description: None,
            is_completed: false,
        }
    }

    /// Sets the description for this task.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the id for this task.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the completion flag for this task.
    pub fn with_completed(mut self, is_completed: bool) -> Self {
        self.is_completed = is_completed;
        self
    }

    /// Replaces the id with a freshly generated one.
    pub fn assign_new_id(&mut self) {
        self.id = generate_task_id();
    }
}

impl<'de> Deserialize<'de> for TodoTask {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(TodoTaskVisitor)
    }
}

struct TodoTaskVisitor;

impl<'de> Visitor<'de> for TodoTaskVisitor {
    type Value = TodoTask;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a task object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut task = TodoTask::default();
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "id" => task.id = map.next_value()?,
                "title" => task.title = map.next_value()?,
                "description" => task.description = map.next_value()?,
                "isCompleted" => task.is_completed = map.next_value()?,
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(task)
    }
}
