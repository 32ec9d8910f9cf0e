//! Processing routines, one per [`OperationKind`].
//!
//! Every routine suspends on `tokio::time::sleep` for its simulated work so a
//! worker thread is never blocked while a delivery is being processed.

use std::time::Duration;

use async_trait::async_trait;
use taskpush_core::{OperationKind, ResizeSpec, TaskPayload, ThumbnailSpec};
use tracing::info;

use super::error::TaskError;

/// Message returned by the `fail` routine.
pub const SIMULATED_FAILURE: &str = "Simulated task failure for testing";

/// Result detail of a routine that completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessDetail {
    pub summary: String,
}

impl ProcessDetail {
    #[must_use]
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
        }
    }
}

/// A processing routine for one operation.
///
/// Implementations return `Err` instead of panicking; a panic is still caught
/// by the dispatch table and reported as a retryable failure.
#[async_trait]
pub trait TaskProcessor: Send + Sync {
    /// The operation this routine handles.
    fn kind(&self) -> OperationKind;

    /// Processes one payload.
    async fn process(&self, payload: &TaskPayload) -> Result<ProcessDetail, TaskError>;
}

// ---------------------------------------------------------------------------
// resize
// ---------------------------------------------------------------------------

pub struct ResizeProcessor {
    work: Duration,
}

impl ResizeProcessor {
    #[must_use]
    pub fn new(work: Duration) -> Self {
        Self { work }
    }
}

#[async_trait]
impl TaskProcessor for ResizeProcessor {
    fn kind(&self) -> OperationKind {
        OperationKind::Resize
    }

    async fn process(&self, payload: &TaskPayload) -> Result<ProcessDetail, TaskError> {
        let spec: ResizeSpec = payload.spec()?;
        let ResizeSpec {
            image_id,
            dimensions,
        } = spec;

        info!(
            image_id = %image_id,
            width = dimensions.width,
            height = dimensions.height,
            "resizing image"
        );
        tokio::time::sleep(self.work).await;
        info!(image_id = %image_id, "image resized");

        Ok(ProcessDetail::new(format!(
            "resized {image_id} to {}x{}",
            dimensions.width, dimensions.height
        )))
    }
}

// ---------------------------------------------------------------------------
// thumbnail
// ---------------------------------------------------------------------------

pub struct ThumbnailProcessor {
    work: Duration,
}

impl ThumbnailProcessor {
    #[must_use]
    pub fn new(work: Duration) -> Self {
        Self { work }
    }
}

#[async_trait]
impl TaskProcessor for ThumbnailProcessor {
    fn kind(&self) -> OperationKind {
        OperationKind::Thumbnail
    }

    async fn process(&self, payload: &TaskPayload) -> Result<ProcessDetail, TaskError> {
        let ThumbnailSpec { image_id } = payload.spec()?;

        info!(image_id = %image_id, "creating thumbnail");
        tokio::time::sleep(self.work).await;
        info!(image_id = %image_id, "thumbnail created");

        Ok(ProcessDetail::new(format!("thumbnail created for {image_id}")))
    }
}

// ---------------------------------------------------------------------------
// fail
// ---------------------------------------------------------------------------

/// Always fails with [`SIMULATED_FAILURE`].
pub struct FailProcessor;

#[async_trait]
impl TaskProcessor for FailProcessor {
    fn kind(&self) -> OperationKind {
        OperationKind::Fail
    }

    async fn process(&self, _payload: &TaskPayload) -> Result<ProcessDetail, TaskError> {
        Err(TaskError::Processing(SIMULATED_FAILURE.to_string()))
    }
}

// ---------------------------------------------------------------------------
// generic
// ---------------------------------------------------------------------------

/// Catch-all routine for unknown or absent operation names.
pub struct GenericProcessor {
    work: Duration,
}

impl GenericProcessor {
    #[must_use]
    pub fn new(work: Duration) -> Self {
        Self { work }
    }
}

#[async_trait]
impl TaskProcessor for GenericProcessor {
    fn kind(&self) -> OperationKind {
        OperationKind::Generic
    }

    async fn process(&self, payload: &TaskPayload) -> Result<ProcessDetail, TaskError> {
        let name = payload.operation().unwrap_or("unknown");

        info!(operation = name, "processing generic task");
        tokio::time::sleep(self.work).await;
        info!(operation = name, "generic task processed");

        Ok(ProcessDetail::new(format!("processed generic task {name}")))
    }
}
