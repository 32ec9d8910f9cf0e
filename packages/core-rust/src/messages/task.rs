//! Response bodies for the task endpoint.
//!
//! Exactly one of these is written per delivery:
//! - [`TaskSuccessBody`] with HTTP 200
//! - [`TaskRejectedBody`] with HTTP 400 (payload can never succeed)
//! - [`TaskFailureBody`] with HTTP 500 (dispatcher should redeliver)

use serde::{Deserialize, Serialize};

use crate::delivery::DeliveryMetadata;
use crate::payload::TaskPayload;

/// Message reported for every successfully processed task.
pub const SUCCESS_MESSAGE: &str = "Task processed successfully";

/// Error reported when the body is not a JSON object.
pub const INVALID_PAYLOAD: &str = "Invalid task payload";

/// HTTP 200 body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSuccessBody {
    pub success: bool,
    pub message: String,
    pub task_name: String,
    /// ISO-8601 completion time.
    pub timestamp: String,
    pub retry_count: u32,
    /// The payload exactly as it was delivered.
    pub data: TaskPayload,
}

impl TaskSuccessBody {
    #[must_use]
    pub fn new(metadata: &DeliveryMetadata, timestamp: String, data: TaskPayload) -> Self {
        Self {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
            task_name: metadata.task_name.clone(),
            timestamp,
            retry_count: metadata.retry_count,
            data,
        }
    }
}

/// HTTP 500 body. Signals a retryable processing failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFailureBody {
    pub success: bool,
    pub error: String,
    pub task_name: String,
    pub timestamp: String,
    pub retry_count: u32,
}

impl TaskFailureBody {
    #[must_use]
    pub fn new(metadata: &DeliveryMetadata, timestamp: String, error: String) -> Self {
        Self {
            success: false,
            error,
            task_name: metadata.task_name.clone(),
            timestamp,
            retry_count: metadata.retry_count,
        }
    }
}

/// HTTP 400 body. The payload is rejected permanently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRejectedBody {
    pub error: String,
}

impl TaskRejectedBody {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn metadata() -> DeliveryMetadata {
        DeliveryMetadata {
            task_name: "t-1".to_string(),
            retry_count: 2,
            ..DeliveryMetadata::default()
        }
    }

    #[test]
    fn success_body_wire_shape() {
        let data: TaskPayload = serde_json::from_value(json!({"operation": "thumbnail"})).unwrap();
        let body = TaskSuccessBody::new(&metadata(), "2024-01-01T00:00:00.000Z".to_string(), data);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "success": true,
                "message": "Task processed successfully",
                "taskName": "t-1",
                "timestamp": "2024-01-01T00:00:00.000Z",
                "retryCount": 2,
                "data": {"operation": "thumbnail"},
            })
        );
    }

    #[test]
    fn failure_body_wire_shape() {
        let body = TaskFailureBody::new(
            &metadata(),
            "2024-01-01T00:00:00.000Z".to_string(),
            "boom".to_string(),
        );
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "success": false,
                "error": "boom",
                "taskName": "t-1",
                "timestamp": "2024-01-01T00:00:00.000Z",
                "retryCount": 2,
            })
        );
    }

    #[test]
    fn rejected_body_has_only_error() {
        let body = TaskRejectedBody::new(INVALID_PAYLOAD);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"error": "Invalid task payload"})
        );
    }
}
