//! Task store error types.

use thiserror::Error;

/// Boxed source error carried by [`TaskStoreError::Unavailable`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur during task store operations.
#[derive(Debug, Error)]
pub enum TaskStoreError {
    /// No task matched the requested id.
    #[error("Task not found: {id}")]
    NotFound { id: String },

    /// The backing store could not serve the request: connectivity loss,
    /// timeout, throttling or a malformed item.
    #[error("{backend} store unavailable: {message}")]
    Unavailable {
        backend: &'static str,
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl TaskStoreError {
    /// Creates a not found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Wraps a client error from the given backend.
    pub fn unavailable<E>(backend: &'static str, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Unavailable {
            backend,
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }

    /// Creates an error for a response the adapter could not interpret.
    pub fn malformed(backend: &'static str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            backend,
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this is a not found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = TaskStoreError::not_found("abc");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Task not found: abc");
    }

    #[test]
    fn test_unavailable_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "connection timed out");
        let err = TaskStoreError::unavailable("dynamodb", io);

        assert!(!err.is_not_found());
        assert_eq!(
            err.to_string(),
            "dynamodb store unavailable: connection timed out"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_malformed_has_no_source() {
        let err = TaskStoreError::malformed("mongodb", "missing Title");
        assert!(err.source().is_none());
    }
}
