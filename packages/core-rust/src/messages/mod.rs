//! JSON wire schemas for every HTTP body the server reads or writes.
//!
//! Field names follow the wire exactly: task bodies are camelCase, the
//! workflow companion endpoints use snake_case.

pub mod scheduler;
pub mod task;
pub mod workflow;

pub use scheduler::SchedulerTriggerResponse;
pub use task::{TaskFailureBody, TaskRejectedBody, TaskSuccessBody};
pub use workflow::{
    Address, InventoryLine, InventoryRequest, InventoryResponse, NotificationReceipt,
    NotificationRequest, Order, OrderItem, PaymentReceipt, PaymentRequest, ShippingEstimate,
    ShippingRequest, TaxRequest, TaxResponse, ValidateOrderRequest, ValidationResponse,
};
