//! Task error taxonomy and its HTTP classification.

use axum::http::StatusCode;
use taskpush_core::PayloadError;

/// Errors that end a delivery without a successful outcome.
///
/// Classification drives the dispatcher: non-retryable errors map to 4xx so
/// an unchanged payload is not expected to succeed later, retryable errors map
/// to 5xx so the dispatcher redelivers.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Body is not a JSON object.
    #[error("Invalid task payload")]
    MalformedPayload(#[source] PayloadError),
    /// Body is an object but lacks fields its operation requires.
    #[error(transparent)]
    InvalidPayload(PayloadError),
    /// A processing routine reported failure.
    #[error("{0}")]
    Processing(String),
    /// A processing routine panicked.
    #[error("task processor panicked: {0}")]
    Panicked(String),
}

impl TaskError {
    /// Returns `true` when redelivering the same payload may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Processing(_) | Self::Panicked(_))
    }

    /// HTTP status reported to the dispatcher.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        if self.is_retryable() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::BAD_REQUEST
        }
    }
}

impl From<PayloadError> for TaskError {
    fn from(err: PayloadError) -> Self {
        match err {
            PayloadError::Fields { .. } => Self::InvalidPayload(err),
            PayloadError::Syntax(_) | PayloadError::NotAnObject { .. } => {
                Self::MalformedPayload(err)
            }
        }
    }
}
