//! HTTP handler definitions for the task server.
//!
//! This module defines `AppState` (the shared state carried through axum
//! extractors) and re-exports all handler functions for building the router.

pub mod health;
pub mod scheduler;
pub mod task;
pub mod workflow;

pub use health::{health_handler, liveness_handler, readiness_handler};
pub use scheduler::scheduler_handler;
pub use task::task_handler;
pub use workflow::workflow_routes;

use std::sync::Arc;
use std::time::Instant;

use taskpush_core::ClockSource;

use super::ShutdownController;
use crate::service::TaskHandler;

/// Shared application state passed to all axum handlers via `State` extraction.
///
/// Holds `Arc` references to shared resources so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Task delivery pipeline with its immutable dispatch table.
    pub tasks: Arc<TaskHandler>,
    /// Graceful shutdown controller with health state and in-flight tracking.
    pub shutdown: Arc<ShutdownController>,
    /// Time source for scheduler and workflow timestamps.
    pub clock: Arc<dyn ClockSource>,
    /// Server process start time, used for uptime calculation.
    pub start_time: Instant,
}
