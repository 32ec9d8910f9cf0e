//! Task delivery handling: parse, dispatch, resolve.
//!
//! [`TaskHandler`] is built once at startup and shared by every request. It
//! holds no per-delivery state; each call to [`TaskHandler::handle`] owns its
//! metadata and payload and returns exactly one [`Resolution`].

use std::sync::Arc;

use axum::http::StatusCode;
use taskpush_core::messages::{TaskFailureBody, TaskRejectedBody, TaskSuccessBody};
use taskpush_core::{iso8601, ClockSource, DeliveryMetadata, SystemClock, TaskPayload};
use tracing::{error, info, warn};

use crate::observability::DELIVERIES_TOTAL;

use super::config::ProcessingConfig;
use super::dispatch::{DispatchTable, Processed};
use super::error::TaskError;
use super::state::DeliveryState;

/// Terminal outcome of one delivery, ready to be written as a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// HTTP 200.
    Succeeded(TaskSuccessBody),
    /// HTTP 400. Not retryable.
    Rejected(TaskRejectedBody),
    /// HTTP 500. The dispatcher should redeliver.
    Failed(TaskFailureBody),
}

impl Resolution {
    #[must_use]
    pub fn state(&self) -> DeliveryState {
        match self {
            Self::Succeeded(_) => DeliveryState::Succeeded,
            Self::Rejected(_) => DeliveryState::FailedBadRequest,
            Self::Failed(_) => DeliveryState::FailedRetryable,
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Succeeded(_) => StatusCode::OK,
            Self::Rejected(_) => StatusCode::BAD_REQUEST,
            Self::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}

/// Maps a dispatch result to its terminal outcome.
#[must_use]
pub fn resolve(
    metadata: &DeliveryMetadata,
    payload: TaskPayload,
    result: Result<Processed, TaskError>,
    timestamp: String,
) -> Resolution {
    match result {
        Ok(_) => Resolution::Succeeded(TaskSuccessBody::new(metadata, timestamp, payload)),
        Err(err) if err.is_retryable() => {
            Resolution::Failed(TaskFailureBody::new(metadata, timestamp, err.to_string()))
        }
        Err(err) => Resolution::Rejected(TaskRejectedBody::new(err.to_string())),
    }
}

// ---------------------------------------------------------------------------
// TaskHandler
// ---------------------------------------------------------------------------

pub struct TaskHandler {
    table: DispatchTable,
    clock: Arc<dyn ClockSource>,
}

impl TaskHandler {
    #[must_use]
    pub fn new(table: DispatchTable, clock: Arc<dyn ClockSource>) -> Self {
        Self { table, clock }
    }

    /// Builds a handler with the standard routines and the system clock.
    #[must_use]
    pub fn from_config(config: &ProcessingConfig) -> Self {
        Self::new(DispatchTable::new(config), Arc::new(SystemClock))
    }

    /// Handles one delivery whose metadata has already been extracted.
    pub async fn handle(&self, metadata: DeliveryMetadata, body: &[u8]) -> Resolution {
        info!(
            state = %DeliveryState::MetadataExtracted,
            task_name = %metadata.task_name,
            queue_name = %metadata.queue_name,
            retry_count = metadata.retry_count,
            execution_count = metadata.execution_count,
            "delivery metadata"
        );

        let payload = match TaskPayload::from_slice(body) {
            Ok(payload) => payload,
            Err(err) => {
                let err = TaskError::from(err);
                warn!(
                    state = %DeliveryState::FailedBadRequest,
                    task_name = %metadata.task_name,
                    error = %err,
                    cause = ?std::error::Error::source(&err),
                    "failed to parse task payload"
                );
                return self.finish(Resolution::Rejected(TaskRejectedBody::new(err.to_string())));
            }
        };
        info!(state = %DeliveryState::PayloadParsed, payload = %payload, "task payload");

        let kind = payload.kind();
        info!(
            state = %DeliveryState::Dispatched,
            operation = %kind,
            requested = payload.operation().unwrap_or("unknown"),
            "processing task"
        );

        let result = self.table.dispatch(&payload).await;
        match &result {
            Ok(processed) => info!(
                task_name = %metadata.task_name,
                operation = %processed.kind,
                elapsed_ms = u64::try_from(processed.elapsed.as_millis()).unwrap_or(u64::MAX),
                detail = %processed.detail.summary,
                "task completed"
            ),
            Err(err) if err.is_retryable() => error!(
                task_name = %metadata.task_name,
                operation = %kind,
                retry_count = metadata.retry_count,
                error = %err,
                "task failed"
            ),
            Err(err) => warn!(
                task_name = %metadata.task_name,
                operation = %kind,
                error = %err,
                "task payload rejected"
            ),
        }

        let timestamp = iso8601(self.clock.now());
        self.finish(resolve(&metadata, payload, result, timestamp))
    }

    fn finish(&self, resolution: Resolution) -> Resolution {
        let state = resolution.state();
        info!(state = %state, status = resolution.status().as_u16(), "delivery resolved");
        metrics::counter!(DELIVERIES_TOTAL, "outcome" => state.as_str()).increment(1);
        resolution
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use serde_json::json;
    use taskpush_core::{FixedClock, OperationKind};

    use super::*;
    use crate::service::processor::{ProcessDetail, SIMULATED_FAILURE};

    fn handler() -> TaskHandler {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        TaskHandler::new(
            DispatchTable::new(&ProcessingConfig::default()),
            Arc::new(FixedClock(at)),
        )
    }

    fn retry(n: u32) -> DeliveryMetadata {
        DeliveryMetadata {
            retry_count: n,
            ..DeliveryMetadata::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn resize_succeeds_and_echoes_payload() {
        let body = json!({
            "operation": "resize",
            "image_id": "img1",
            "dimensions": {"width": 100, "height": 50}
        });
        let resolution = handler()
            .handle(DeliveryMetadata::default(), body.to_string().as_bytes())
            .await;

        assert_eq!(resolution.status(), StatusCode::OK);
        let Resolution::Succeeded(success) = resolution else {
            panic!("expected success, got {resolution:?}");
        };
        assert!(success.success);
        assert_eq!(success.task_name, "unknown");
        assert_eq!(success.retry_count, 0);
        assert_eq!(success.timestamp, "2024-05-01T12:00:00.000Z");
        assert_eq!(success.data.into_value(), body);
    }

    #[tokio::test(start_paused = true)]
    async fn fail_resolves_retryable_with_retry_count() {
        let resolution = handler().handle(retry(2), br#"{"operation":"fail"}"#).await;

        assert_eq!(resolution.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resolution.state(), DeliveryState::FailedRetryable);
        let Resolution::Failed(failure) = resolution else {
            panic!("expected failure");
        };
        assert!(!failure.success);
        assert_eq!(failure.retry_count, 2);
        assert_eq!(failure.error, SIMULATED_FAILURE);
    }

    #[tokio::test]
    async fn invalid_json_is_rejected() {
        let resolution = handler().handle(retry(5), b"{not json").await;
        assert_eq!(resolution.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            resolution,
            Resolution::Rejected(TaskRejectedBody::new("Invalid task payload"))
        );
    }

    #[tokio::test]
    async fn resize_missing_dimensions_is_rejected_not_retried() {
        let resolution = handler()
            .handle(
                DeliveryMetadata::default(),
                br#"{"operation":"resize","image_id":"img1"}"#,
            )
            .await;
        assert_eq!(resolution.state(), DeliveryState::FailedBadRequest);
        let Resolution::Rejected(rejected) = resolution else {
            panic!("expected rejection");
        };
        assert!(rejected.error.contains("dimensions"));
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_and_absent_operations_succeed() {
        for body in [json!({"operation": "transcode", "n": 1}), json!({"n": 2})] {
            let resolution = handler()
                .handle(DeliveryMetadata::default(), body.to_string().as_bytes())
                .await;
            let Resolution::Succeeded(success) = resolution else {
                panic!("expected success for {body}");
            };
            assert_eq!(success.data.into_value(), body);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_deliveries_share_the_simulated_wait() {
        let handler = handler();
        let body = br#"{"operation":"resize","image_id":"a","dimensions":{"width":1,"height":1}}"#;

        let start = tokio::time::Instant::now();
        let (first, second) = tokio::join!(
            handler.handle(DeliveryMetadata::default(), body),
            handler.handle(DeliveryMetadata::default(), body),
        );

        assert!(first.is_success());
        assert!(second.is_success());
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(1), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(1500), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn identical_deliveries_resolve_identically() {
        let handler = handler();
        let bodies: [&[u8]; 3] = [
            br#"{"operation":"thumbnail","image_id":"x"}"#,
            br#"{"operation":"fail"}"#,
            b"nope",
        ];
        for body in bodies {
            let first = handler.handle(retry(1), body).await;
            let second = handler.handle(retry(1), body).await;
            assert_eq!(first, second);
        }
    }

    #[test]
    fn resolve_maps_results_to_status() {
        let meta = DeliveryMetadata::default();
        let ts = "2024-01-01T00:00:00.000Z".to_string();
        let ok = Ok(Processed {
            kind: OperationKind::Generic,
            detail: ProcessDetail::new("done"),
            elapsed: Duration::ZERO,
        });
        assert_eq!(
            resolve(&meta, TaskPayload::default(), ok, ts.clone()).status(),
            StatusCode::OK
        );
        assert_eq!(
            resolve(
                &meta,
                TaskPayload::default(),
                Err(TaskError::Processing("x".into())),
                ts.clone()
            )
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            resolve(
                &meta,
                TaskPayload::default(),
                Err(TaskError::Panicked("x".into())),
                ts
            )
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    proptest! {
        #[test]
        fn arbitrary_bodies_always_resolve(body in proptest::collection::vec(any::<u8>(), 0..64)) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .start_paused(true)
                .build()
                .unwrap();
            let resolution = rt.block_on(handler().handle(DeliveryMetadata::default(), &body));
            prop_assert!(resolution.state().is_terminal());
        }
    }
}
