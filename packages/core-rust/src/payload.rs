//! Task payload parsing and per-operation field extraction.
//!
//! A payload is any JSON object. It is kept as an untyped map so the server
//! can echo it back byte-for-byte equivalent in the success body; typed views
//! ([`ResizeSpec`], [`ThumbnailSpec`]) are decoded on demand by the routine
//! that needs them.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::operation::OperationKind;

/// Errors produced while turning a request body into a [`TaskPayload`] or
/// decoding an operation-specific view of it.
///
/// None of these can succeed on redelivery of the same body.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("payload is not valid JSON: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error("payload must be a JSON object, got {kind}")]
    NotAnObject { kind: &'static str },
    #[error("Invalid {operation} payload: {source}")]
    Fields {
        operation: OperationKind,
        #[source]
        source: serde_json::Error,
    },
}

/// The body of a task delivery: a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskPayload(Map<String, Value>);

impl TaskPayload {
    /// Parses a raw request body.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::Syntax`] for empty or invalid JSON and
    /// [`PayloadError::NotAnObject`] for JSON that is not an object.
    pub fn from_slice(body: &[u8]) -> Result<Self, PayloadError> {
        match serde_json::from_slice::<Value>(body)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(PayloadError::NotAnObject {
                kind: json_kind(&other),
            }),
        }
    }

    /// Returns the `operation` field when it is a string.
    #[must_use]
    pub fn operation(&self) -> Option<&str> {
        self.0.get("operation").and_then(Value::as_str)
    }

    /// Returns the operation tag this payload routes to.
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        OperationKind::from_name(self.operation())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Decodes the operation-specific view `T` of this payload.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::Fields`] when a required field is missing or
    /// has the wrong type.
    pub fn spec<T: OperationSpec>(&self) -> Result<T, PayloadError> {
        serde_json::from_value(Value::Object(self.0.clone())).map_err(|source| {
            PayloadError::Fields {
                operation: T::OPERATION,
                source,
            }
        })
    }
}

/// Compact JSON rendering, used for payload dumps in logs.
impl fmt::Display for TaskPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(&self.0).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl From<Map<String, Value>> for TaskPayload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A typed view of the fields a specific operation requires.
pub trait OperationSpec: DeserializeOwned {
    const OPERATION: OperationKind;
}

/// Target size of a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Fields required by the `resize` operation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResizeSpec {
    pub image_id: String,
    pub dimensions: Dimensions,
}

impl OperationSpec for ResizeSpec {
    const OPERATION: OperationKind = OperationKind::Resize;
}

/// Fields required by the `thumbnail` operation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThumbnailSpec {
    pub image_id: String,
}

impl OperationSpec for ThumbnailSpec {
    const OPERATION: OperationKind = OperationKind::Thumbnail;
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
