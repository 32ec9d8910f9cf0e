//! Task delivery endpoint.
//!
//! Every request that reaches the handler ends in exactly one [`Resolution`].
//! Bodies over the size limit are answered with 413 by the body-limit layer
//! and the `Bytes` extractor before the handler runs.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method};
use axum::response::{IntoResponse, Response};
use axum::Json;
use taskpush_core::DeliveryMetadata;
use tracing::info;

use super::AppState;
use crate::service::{DeliveryState, Resolution};

/// Handles one push delivery from the task queue.
///
/// The body is taken as raw bytes so malformed JSON resolves to the task
/// rejection body rather than axum's extractor error.
pub async fn task_handler(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Resolution {
    let _in_flight = state.shutdown.in_flight_guard();

    info!(
        state = %DeliveryState::Received,
        method = %method,
        body_bytes = body.len(),
        "task delivery received"
    );

    let metadata =
        DeliveryMetadata::from_lookup(|name| headers.get(name).and_then(|v| v.to_str().ok()));

    state.tasks.handle(metadata, &body).await
}

impl IntoResponse for Resolution {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Succeeded(body) => (status, Json(body)).into_response(),
            Self::Rejected(body) => (status, Json(body)).into_response(),
            Self::Failed(body) => (status, Json(body)).into_response(),
        }
    }
}
