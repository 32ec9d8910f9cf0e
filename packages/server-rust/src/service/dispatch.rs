//! Operation dispatch: routes a payload to its processing routine and times it.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use taskpush_core::{OperationKind, TaskPayload};
use tokio::time::Instant;
use tracing::{info_span, Instrument};

use crate::observability::PROCESSING_DURATION;

use super::config::ProcessingConfig;
use super::error::TaskError;
use super::processor::{
    FailProcessor, GenericProcessor, ProcessDetail, ResizeProcessor, TaskProcessor,
    ThumbnailProcessor,
};

/// A routine that completed, with how long it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processed {
    pub kind: OperationKind,
    pub detail: ProcessDetail,
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// DispatchTable
// ---------------------------------------------------------------------------

/// Immutable mapping from [`OperationKind`] to its routine.
///
/// One slot per variant, so every operation tag has a routine and adding a
/// variant fails to compile until it is wired in here.
#[derive(Clone)]
pub struct DispatchTable {
    resize: Arc<dyn TaskProcessor>,
    thumbnail: Arc<dyn TaskProcessor>,
    fail: Arc<dyn TaskProcessor>,
    generic: Arc<dyn TaskProcessor>,
}

impl DispatchTable {
    /// Builds the table with the standard routines.
    #[must_use]
    pub fn new(config: &ProcessingConfig) -> Self {
        Self {
            resize: Arc::new(ResizeProcessor::new(config.resize_work)),
            thumbnail: Arc::new(ThumbnailProcessor::new(config.thumbnail_work)),
            fail: Arc::new(FailProcessor),
            generic: Arc::new(GenericProcessor::new(config.generic_work)),
        }
    }

    /// Replaces the routine for `kind`.
    #[must_use]
    pub fn with_processor(mut self, kind: OperationKind, processor: Arc<dyn TaskProcessor>) -> Self {
        match kind {
            OperationKind::Resize => self.resize = processor,
            OperationKind::Thumbnail => self.thumbnail = processor,
            OperationKind::Fail => self.fail = processor,
            OperationKind::Generic => self.generic = processor,
        }
        self
    }

    /// Returns the routine registered for `kind`.
    #[must_use]
    pub fn route(&self, kind: OperationKind) -> &Arc<dyn TaskProcessor> {
        match kind {
            OperationKind::Resize => &self.resize,
            OperationKind::Thumbnail => &self.thumbnail,
            OperationKind::Fail => &self.fail,
            OperationKind::Generic => &self.generic,
        }
    }

    /// Runs the routine selected by the payload's operation to completion.
    ///
    /// Panics inside the routine are caught and returned as
    /// [`TaskError::Panicked`], so a delivery always resolves.
    ///
    /// # Errors
    ///
    /// Returns whatever error the routine reports.
    pub async fn dispatch(&self, payload: &TaskPayload) -> Result<Processed, TaskError> {
        let kind = payload.kind();
        let processor = Arc::clone(self.route(kind));

        let span = info_span!(
            "process",
            operation = %kind,
            elapsed_ms = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );

        async move {
            let start = Instant::now();
            let result = AssertUnwindSafe(processor.process(payload))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(TaskError::Panicked(panic_message(panic.as_ref()))));
            let elapsed = start.elapsed();

            let outcome = if result.is_ok() { "ok" } else { "error" };
            let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
            tracing::Span::current().record("elapsed_ms", elapsed_ms);
            tracing::Span::current().record("outcome", outcome);

            metrics::histogram!(
                PROCESSING_DURATION,
                "operation" => kind.as_str(),
                "outcome" => outcome
            )
            .record(elapsed.as_secs_f64());

            result.map(|detail| Processed {
                kind,
                detail,
                elapsed,
            })
        }
        .instrument(span)
        .await
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
