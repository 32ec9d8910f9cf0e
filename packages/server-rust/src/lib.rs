//! `taskpush` Server: push-style task-queue consumer over HTTP.
//!
//! - [`service`]: delivery handling, operation dispatch, failure classification
//! - [`network`]: axum router, middleware, health, and graceful shutdown
//! - [`observability`]: logging and metrics setup

pub mod network;
pub mod observability;
pub mod service;

pub use network::{HealthState, NetworkConfig, NetworkModule, ShutdownController};
pub use observability::{init_logging, LogFormat};
pub use service::{ProcessingConfig, Resolution, TaskError, TaskHandler};
