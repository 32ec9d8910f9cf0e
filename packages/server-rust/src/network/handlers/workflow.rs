//! Order workflow companion endpoints, nested under `/workflow`.
//!
//! Thin adapters over [`crate::service::workflow`]: extract JSON, call the
//! pure function, log both sides.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use taskpush_core::messages::{
    InventoryRequest, InventoryResponse, NotificationReceipt, NotificationRequest, PaymentReceipt,
    PaymentRequest, ShippingEstimate, ShippingRequest, TaxRequest, TaxResponse,
    ValidateOrderRequest, ValidationResponse,
};
use tracing::info;

use super::AppState;
use crate::service::workflow;

/// Routes for the six workflow steps, relative to their mount point.
pub fn workflow_routes() -> Router<AppState> {
    Router::new()
        .route("/validate", post(validate_handler))
        .route("/inventory", post(inventory_handler))
        .route("/shipping", post(shipping_handler))
        .route("/tax", post(tax_handler))
        .route("/payment", post(payment_handler))
        .route("/notification", post(notification_handler))
}

async fn validate_handler(Json(req): Json<ValidateOrderRequest>) -> Json<ValidationResponse> {
    info!(request = ?req, "validating order");
    let resp = workflow::validate_order(&req);
    info!(valid = resp.valid, "order validation result");
    Json(resp)
}

async fn inventory_handler(Json(req): Json<InventoryRequest>) -> Json<InventoryResponse> {
    info!(items = req.items.len(), "checking inventory");
    let resp = workflow::check_inventory(&req);
    info!(available = resp.available, "inventory result");
    Json(resp)
}

async fn shipping_handler(Json(req): Json<ShippingRequest>) -> Json<ShippingEstimate> {
    info!(request = ?req, "estimating shipping");
    let resp = workflow::estimate_shipping(&req);
    info!(days = %resp.days, cost = resp.cost, "shipping estimate");
    Json(resp)
}

async fn tax_handler(Json(req): Json<TaxRequest>) -> Json<TaxResponse> {
    info!(total = req.total, state = ?req.state, "calculating tax");
    let resp = workflow::calculate_tax(&req);
    info!(tax = resp.tax, rate = resp.rate, "tax calculated");
    Json(resp)
}

async fn payment_handler(
    State(state): State<AppState>,
    Json(req): Json<PaymentRequest>,
) -> Json<PaymentReceipt> {
    info!(order_id = ?req.order_id, amount = ?req.amount, "processing payment");
    let resp = workflow::process_payment(&req, state.clock.now(), &mut rand::rng());
    info!(transaction_id = %resp.transaction_id, "payment completed");
    Json(resp)
}

async fn notification_handler(
    State(state): State<AppState>,
    Json(req): Json<NotificationRequest>,
) -> Json<NotificationReceipt> {
    info!(order_id = ?req.order_id, customer_id = ?req.customer_id, "sending notification");
    let resp = workflow::send_notification(&req, state.clock.now());
    info!(sent = resp.sent, "notification sent");
    Json(resp)
}
