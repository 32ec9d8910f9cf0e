//! Periodic scheduler trigger endpoint.

use axum::extract::State;
use axum::http::{header, HeaderMap, Method};
use axum::Json;
use taskpush_core::iso8601;
use taskpush_core::messages::SchedulerTriggerResponse;
use tracing::info;

use super::AppState;

/// Acknowledges a scheduler invocation. Stateless; any method routed here
/// gets the same answer.
pub async fn scheduler_handler(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
) -> Json<SchedulerTriggerResponse> {
    let timestamp = iso8601(state.clock.now());
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    info!(%timestamp, %method, user_agent, "scheduler triggered");

    Json(SchedulerTriggerResponse::triggered_at(timestamp))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Instant;

    use axum::http::HeaderValue;
    use chrono::{TimeZone, Utc};
    use taskpush_core::FixedClock;

    use super::*;
    use crate::network::ShutdownController;
    use crate::service::{ProcessingConfig, TaskHandler};

    #[tokio::test]
    async fn reports_trigger_time_from_clock() {
        let state = AppState {
            tasks: Arc::new(TaskHandler::from_config(&ProcessingConfig::default())),
            shutdown: Arc::new(ShutdownController::new()),
            clock: Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap())),
            start_time: Instant::now(),
        };
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("Google-Cloud-Scheduler"));

        let Json(resp) = scheduler_handler(State(state), Method::POST, headers).await;
        assert!(resp.success);
        assert_eq!(resp.timestamp, "2024-03-01T09:30:00.000Z");
        assert_eq!(resp.message, "Scheduler triggered at 2024-03-01T09:30:00.000Z");
        assert_eq!(resp.executed_by, "scheduler");
    }
}
