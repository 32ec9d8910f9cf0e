//! Order workflow companion logic.
//!
//! Each function is a pure mapping from request to response. Anything
//! time- or randomness-dependent takes it as an argument.

use chrono::{DateTime, Utc};
use rand::Rng;
use taskpush_core::iso8601;
use taskpush_core::messages::{
    InventoryLine, InventoryRequest, InventoryResponse, NotificationReceipt, NotificationRequest,
    PaymentReceipt, PaymentRequest, ShippingEstimate, ShippingRequest, TaxRequest, TaxResponse,
    ValidateOrderRequest, ValidationResponse,
};

pub const VALIDATION_PASSED: &str = "Order validation passed";
pub const VALIDATION_FAILED: &str = "Order validation failed - missing required fields";

/// Applied when the state has no entry in [`tax_rate`].
pub const DEFAULT_TAX_RATE: f64 = 0.07;

const SHIPPING_COST: f64 = 9.99;
const TRANSACTION_SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[must_use]
pub fn validate_order(req: &ValidateOrderRequest) -> ValidationResponse {
    let valid = req.order.as_ref().is_some_and(|order| {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        present(&order.order_id)
            && present(&order.customer_id)
            && order.items.as_ref().is_some_and(|items| !items.is_empty())
            && order.total.is_some_and(|total| total > 0.0)
    });

    ValidationResponse {
        valid,
        message: if valid {
            VALIDATION_PASSED
        } else {
            VALIDATION_FAILED
        }
        .to_string(),
    }
}

/// Reports every requested item as fully in stock.
#[must_use]
pub fn check_inventory(req: &InventoryRequest) -> InventoryResponse {
    InventoryResponse {
        available: true,
        items: req
            .items
            .iter()
            .map(|item| InventoryLine {
                product_id: item.product_id.clone(),
                requested: item.quantity,
                available: item.quantity,
                in_stock: true,
            })
            .collect(),
    }
}

#[must_use]
pub fn estimate_shipping(req: &ShippingRequest) -> ShippingEstimate {
    let state = req.address.as_ref().and_then(|a| a.state.as_deref());
    let days = if state == Some("CA") { "2-3" } else { "3-5" };

    ShippingEstimate {
        days: days.to_string(),
        cost: SHIPPING_COST,
        method: "Ground".to_string(),
        carrier: "USPS".to_string(),
    }
}

#[must_use]
pub fn tax_rate(state: Option<&str>) -> f64 {
    match state {
        Some("CA") => 0.0875,
        Some("NY") => 0.08,
        Some("TX") => 0.0625,
        Some("FL") => 0.06,
        _ => DEFAULT_TAX_RATE,
    }
}

/// Tax on `total`, rounded to cents.
#[must_use]
pub fn calculate_tax(req: &TaxRequest) -> TaxResponse {
    let rate = tax_rate(req.state.as_deref());
    let tax = (req.total * rate * 100.0).round() / 100.0;

    TaxResponse {
        tax,
        rate,
        state: req.state.clone(),
    }
}

/// Accepts every payment and issues a `TXN-<millis>-<suffix>` transaction id.
pub fn process_payment<R: Rng>(
    req: &PaymentRequest,
    now: DateTime<Utc>,
    rng: &mut R,
) -> PaymentReceipt {
    let suffix: String = (0..TRANSACTION_SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
        .collect();

    PaymentReceipt {
        success: true,
        transaction_id: format!("TXN-{}-{suffix}", now.timestamp_millis()),
        amount: req.amount,
        order_id: req.order_id.clone(),
        status: "completed".to_string(),
        timestamp: iso8601(now),
    }
}

#[must_use]
pub fn send_notification(req: &NotificationRequest, now: DateTime<Utc>) -> NotificationReceipt {
    NotificationReceipt {
        sent: true,
        order_id: req.order_id.clone(),
        customer_id: req.customer_id.clone(),
        notification_type: "order_confirmation".to_string(),
        timestamp: iso8601(now),
    }
}
