//! WebAssembly module for the Stockroom inventory tracker
//!
//! Provides client-side computation for:
//! - Inventory status classification
//! - Idle-day calculation
//! - Movement form validation

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("stockroom-wasm loaded"));
}

/// Classify a balance as HEALTHY, LOW or DEAD
///
/// Rejects a quantity that is not a finite number instead of classifying it.
#[wasm_bindgen]
pub fn classify_inventory_status(
    quantity: f64,
    reorder_level: i32,
    days_idle: i64,
    dead_days: i64,
) -> Result<String, JsValue> {
    status_for(quantity, reorder_level, days_idle, dead_days)
        .map(|status| status.as_str().to_string())
        .ok_or_else(|| JsValue::from_str("quantity must be a finite number"))
}

fn status_for(
    quantity: f64,
    reorder_level: i32,
    days_idle: i64,
    dead_days: i64,
) -> Option<InventoryStatus> {
    if !quantity.is_finite() {
        return None;
    }
    let quantity = Decimal::try_from(quantity).ok()?;
    Some(shared::health::derive_status(
        quantity,
        reorder_level,
        days_idle,
        dead_days,
    ))
}

/// Badge label for a status string ("OK" for healthy or unknown values)
#[wasm_bindgen]
pub fn inventory_status_label(status: &str) -> String {
    match status {
        "DEAD" => InventoryStatus::Dead.label(),
        "LOW" => InventoryStatus::Low.label(),
        _ => InventoryStatus::Healthy.label(),
    }
    .to_string()
}

/// Whole idle days between two epoch-millisecond timestamps
#[wasm_bindgen]
pub fn days_idle_between(now_ms: f64, last_ms: f64) -> i64 {
    match (to_datetime(now_ms), to_datetime(last_ms)) {
        (Some(now), Some(last)) => shared::health::days_idle(now, last),
        _ => 0,
    }
}

/// Whole idle days since an epoch-millisecond timestamp, using the browser clock
#[wasm_bindgen]
pub fn days_idle_since(last_ms: f64) -> i64 {
    days_idle_between(js_sys::Date::now(), last_ms)
}

fn to_datetime(ms: f64) -> Option<DateTime<Utc>> {
    if !ms.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(ms as i64)
}

/// Validate a movement form before submitting it
///
/// Takes the request as JSON and returns the error message, if any.
#[wasm_bindgen]
pub fn validate_movement_request(request_json: &str) -> Result<(), JsValue> {
    let request: MovementRequest = serde_json::from_str(request_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid movement JSON: {}", e)))?;

    validate_movement(&request)
        .map(|_| ())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_inventory_status() {
        assert_eq!(status_for(40.0, 50, 10, 60), Some(InventoryStatus::Low));
        assert_eq!(status_for(40.0, 50, 90, 60), Some(InventoryStatus::Dead));
        assert_eq!(status_for(400.0, 50, 10, 60), Some(InventoryStatus::Healthy));
        assert_eq!(status_for(0.0, 50, 10, 60), Some(InventoryStatus::Low));
    }

    #[test]
    fn test_non_finite_quantity_is_not_classified() {
        assert_eq!(status_for(f64::NAN, 50, 10, 60), None);
        assert_eq!(status_for(f64::INFINITY, 50, 10, 60), None);
        assert_eq!(status_for(f64::NEG_INFINITY, 50, 10, 60), None);
        assert_eq!(status_for(1e300, 50, 10, 60), None);
    }

    #[test]
    fn test_inventory_status_label() {
        assert_eq!(inventory_status_label("DEAD"), "DEAD");
        assert_eq!(inventory_status_label("LOW"), "LOW");
        assert_eq!(inventory_status_label("HEALTHY"), "OK");
        assert_eq!(inventory_status_label("???"), "OK");
    }

    #[test]
    fn test_days_idle_between() {
        let day = 24.0 * 60.0 * 60.0 * 1000.0;
        let now = 1_700_000_000_000.0;
        assert_eq!(days_idle_between(now, now - 10.0 * day), 10);
        assert_eq!(days_idle_between(now, now - 1.5 * day), 1);
        assert_eq!(days_idle_between(f64::NAN, now), 0);
    }
}
