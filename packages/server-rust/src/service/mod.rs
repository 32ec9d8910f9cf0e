//! Task processing framework.
//!
//! This module implements the delivery pipeline behind the task endpoint:
//!
//! 1. **Handling** (`handler`): body -> `TaskPayload` -> dispatch -> `Resolution`
//! 2. **Dispatch** (`dispatch`): immutable `OperationKind` -> routine table, timing
//! 3. **Routines** (`processor`): one `TaskProcessor` per operation
//! 4. **Classification** (`error`, `state`): retryable vs. permanent failures
//! 5. **Workflow companion** (`workflow`): stateless order-step calculations

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod processor;
pub mod state;
pub mod workflow;

// Re-export key types for convenient access.
pub use config::ProcessingConfig;
pub use dispatch::{DispatchTable, Processed};
pub use error::TaskError;
pub use handler::{resolve, Resolution, TaskHandler};
pub use processor::{ProcessDetail, TaskProcessor, SIMULATED_FAILURE};
pub use state::DeliveryState;
