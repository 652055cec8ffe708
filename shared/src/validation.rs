//! Validation utilities for Stockroom requests
//!
//! Everything here is pure and runs before any storage access, so a
//! rejected request never opens a transaction.

use rust_decimal::Decimal;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    MovementKind, MovementRequest, MovementType, NewProduct, ProductChanges, ValidatedMovement,
    DEFAULT_UNIT,
};

// ============================================================================
// Movement Validations
// ============================================================================

/// Decimal places kept by stored quantities
pub const MAX_QUANTITY_SCALE: u32 = 4;

/// Largest quantity a movement or a balance can hold (`NUMERIC(18, 4)`)
// 999_999_999_999_999_999 split into 32-bit words (`Decimal::new` is not const)
pub const MAX_QUANTITY: Decimal =
    Decimal::from_parts(0xA763_FFFF, 0x0DE0_B6B3, 0, false, MAX_QUANTITY_SCALE);

/// Error for a credit that would push a balance past [`MAX_QUANTITY`]
pub fn balance_out_of_range() -> LedgerError {
    LedgerError::validation(
        "quantity",
        "resulting balance exceeds the maximum stock quantity",
    )
}

/// Check the shape of a movement request and resolve its location pair
///
/// Existence of the referenced product and locations is checked later,
/// inside the ledger transaction.
pub fn validate_movement(request: &MovementRequest) -> LedgerResult<ValidatedMovement> {
    if request.product_id <= 0 {
        return Err(LedgerError::validation("productId", "productId is required"));
    }

    let movement_type: MovementType = request.movement_type.parse().map_err(|_| {
        LedgerError::validation("type", "type must be one of IN, OUT, DAMAGE, TRANSFER")
    })?;

    if request.quantity <= Decimal::ZERO {
        return Err(LedgerError::validation("quantity", "quantity must be > 0"));
    }
    if request.quantity.normalize().scale() > MAX_QUANTITY_SCALE {
        return Err(LedgerError::validation(
            "quantity",
            "quantity supports at most 4 decimal places",
        ));
    }
    if request.quantity > MAX_QUANTITY {
        return Err(LedgerError::validation(
            "quantity",
            "quantity must be < 100000000000000",
        ));
    }

    let from = positive_id(request.from_location_id);
    let to = positive_id(request.to_location_id);

    let kind = match movement_type {
        MovementType::In => MovementKind::In {
            to: to.ok_or_else(|| {
                LedgerError::validation("toLocationId", "IN requires toLocationId")
            })?,
        },
        MovementType::Out => MovementKind::Out {
            from: from.ok_or_else(|| {
                LedgerError::validation("fromLocationId", "OUT requires fromLocationId")
            })?,
        },
        MovementType::Damage => MovementKind::Damage {
            from: from.ok_or_else(|| {
                LedgerError::validation("fromLocationId", "DAMAGE requires fromLocationId")
            })?,
        },
        MovementType::Transfer => match (from, to) {
            (Some(from), Some(to)) if from == to => {
                return Err(LedgerError::validation(
                    "toLocationId",
                    "TRANSFER requires different locations",
                ))
            }
            (Some(from), Some(to)) => MovementKind::Transfer { from, to },
            _ => {
                return Err(LedgerError::validation(
                    "fromLocationId/toLocationId",
                    "TRANSFER requires fromLocationId and toLocationId",
                ))
            }
        },
    };

    Ok(ValidatedMovement {
        product_id: request.product_id,
        kind,
        quantity: request.quantity,
        reason: normalize_reason(request.reason.as_deref()),
    })
}

fn positive_id(id: Option<i64>) -> Option<i64> {
    id.filter(|id| *id > 0)
}

/// Trim a free-text reason; blank reasons are stored as absent
pub fn normalize_reason(reason: Option<&str>) -> Option<String> {
    reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
}

// ============================================================================
// Product & Location Validations
// ============================================================================

/// Trim a required text field, rejecting blank values
pub fn require_text(field: &str, value: Option<&str>) -> LedgerResult<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| LedgerError::validation(field, format!("{} is required", field)))
}

/// Validate a reorder level given as a JSON number; fractions are truncated
pub fn normalize_reorder_level(value: f64) -> Result<i32, &'static str> {
    if !value.is_finite() || value < 0.0 {
        return Err("reorderLevel must be a number >= 0");
    }
    let truncated = value.trunc();
    if truncated > f64::from(i32::MAX) {
        return Err("reorderLevel is too large");
    }
    Ok(truncated as i32)
}

/// Parse a reorder level from text (CSV cells); blank means zero
pub fn parse_reorder_level(text: &str) -> Option<i32> {
    let text = text.trim();
    if text.is_empty() {
        return Some(0);
    }
    text.parse::<f64>()
        .ok()
        .and_then(|v| normalize_reorder_level(v).ok())
}

/// Validate the fields of a new product
pub fn validate_new_product(
    sku_code: Option<&str>,
    name: Option<&str>,
    unit: Option<&str>,
    reorder_level: Option<f64>,
) -> LedgerResult<NewProduct> {
    let sku_code = require_text("skuCode", sku_code)?;
    let name = require_text("name", name)?;
    let unit = require_text("unit", unit)?;
    let reorder_level = normalize_reorder_level(reorder_level.unwrap_or(0.0))
        .map_err(|msg| LedgerError::validation("reorderLevel", msg))?;

    Ok(NewProduct {
        sku_code,
        name,
        unit,
        reorder_level,
    })
}

/// Validate a partial product update; at least one field must be present
pub fn validate_product_changes(
    name: Option<&str>,
    unit: Option<&str>,
    reorder_level: Option<f64>,
) -> LedgerResult<ProductChanges> {
    let changes = ProductChanges {
        name: name
            .map(|n| non_blank("name", n))
            .transpose()?,
        unit: unit
            .map(|u| non_blank("unit", u))
            .transpose()?,
        reorder_level: reorder_level
            .map(|r| {
                normalize_reorder_level(r).map_err(|msg| LedgerError::validation("reorderLevel", msg))
            })
            .transpose()?,
    };

    if changes.is_empty() {
        return Err(LedgerError::validation(
            "body",
            "Provide at least one field to update: name, unit, reorderLevel",
        ));
    }
    Ok(changes)
}

fn non_blank(field: &str, value: &str) -> LedgerResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::validation(
            field,
            format!("{} must be a non-empty string", field),
        ));
    }
    Ok(trimmed.to_string())
}

/// Unit to use when an import row leaves it blank
pub fn unit_or_default(unit: Option<&str>) -> String {
    unit.map(str::trim)
        .filter(|u| !u.is_empty())
        .unwrap_or(DEFAULT_UNIT)
        .to_string()
}

// ============================================================================
// Query Parameter Validations
// ============================================================================

/// Parse a strictly positive integer query value; fractions are truncated
pub fn parse_positive_int(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(v) = text.parse::<i64>() {
        return (v > 0).then_some(v);
    }
    let v = text.parse::<f64>().ok().filter(|v| v.is_finite())?.trunc();
    (v > 0.0 && v < i64::MAX as f64).then_some(v as i64)
}

/// Resolve the `deadDays` threshold, falling back to `default` when absent
pub fn parse_dead_days(value: Option<&str>, default: i64) -> Result<i64, &'static str> {
    match value {
        None => Ok(default),
        Some(text) => parse_positive_int(text).ok_or("deadDays must be a positive integer"),
    }
}

/// Resolve the ledger page `limit`; values over the maximum are clamped later
pub fn parse_page_limit(value: Option<&str>) -> Result<Option<u32>, &'static str> {
    value
        .map(|text| {
            parse_positive_int(text)
                .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
                .ok_or("limit must be a positive integer")
        })
        .transpose()
}

/// Resolve the ledger page `cursor`
pub fn parse_cursor(value: Option<&str>) -> Result<Option<i64>, &'static str> {
    value
        .map(|text| parse_positive_int(text).ok_or("cursor must be a positive integer"))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(movement_type: &str, from: Option<i64>, to: Option<i64>) -> MovementRequest {
        MovementRequest {
            product_id: 1,
            movement_type: movement_type.to_string(),
            quantity: Decimal::from(5),
            from_location_id: from,
            to_location_id: to,
            reason: None,
        }
    }

    fn field_of(err: LedgerError) -> String {
        match err {
            LedgerError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    // ========================================================================
    // Movement Validation Tests
    // ========================================================================

    #[test]
    fn test_in_requires_to_location() {
        let err = validate_movement(&request("IN", Some(1), None)).unwrap_err();
        assert_eq!(field_of(err), "toLocationId");
    }

    #[test]
    fn test_in_ignores_from_location() {
        let movement = validate_movement(&request("IN", Some(3), Some(2))).unwrap();
        assert_eq!(movement.kind, MovementKind::In { to: 2 });
        assert_eq!(movement.from_location(), None);
    }

    #[test]
    fn test_out_and_damage_require_from_location() {
        for t in ["OUT", "DAMAGE"] {
            let err = validate_movement(&request(t, None, Some(2))).unwrap_err();
            assert_eq!(field_of(err), "fromLocationId");
        }
        let movement = validate_movement(&request("DAMAGE", Some(4), Some(2))).unwrap();
        assert_eq!(movement.kind, MovementKind::Damage { from: 4 });
        assert_eq!(movement.to_location(), None);
    }

    #[test]
    fn test_transfer_requires_both_locations() {
        assert!(validate_movement(&request("TRANSFER", Some(1), None)).is_err());
        assert!(validate_movement(&request("TRANSFER", None, Some(1))).is_err());
        let movement = validate_movement(&request("TRANSFER", Some(1), Some(2))).unwrap();
        assert_eq!(movement.kind, MovementKind::Transfer { from: 1, to: 2 });
    }

    #[test]
    fn test_transfer_rejects_same_location() {
        let err = validate_movement(&request("TRANSFER", Some(7), Some(7))).unwrap_err();
        assert!(err.to_string().contains("different locations"));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = validate_movement(&request("ADJUST", Some(1), Some(2))).unwrap_err();
        assert_eq!(field_of(err), "type");
        // Types are case sensitive
        assert!(validate_movement(&request("in", None, Some(2))).is_err());
    }

    #[test]
    fn test_quantity_must_be_positive() {
        let mut req = request("IN", None, Some(1));
        req.quantity = Decimal::ZERO;
        assert_eq!(field_of(validate_movement(&req).unwrap_err()), "quantity");
        req.quantity = Decimal::from(-3);
        assert_eq!(field_of(validate_movement(&req).unwrap_err()), "quantity");
    }

    #[test]
    fn test_quantity_scale_limit() {
        let mut req = request("IN", None, Some(1));
        req.quantity = Decimal::new(12_345, 4);
        assert!(validate_movement(&req).is_ok());
        req.quantity = Decimal::new(1_500_000, 6);
        assert!(validate_movement(&req).is_ok());
        req.quantity = Decimal::new(12_345, 5);
        assert_eq!(field_of(validate_movement(&req).unwrap_err()), "quantity");
    }

    #[test]
    fn test_quantity_upper_bound() {
        let mut req = request("IN", None, Some(1));
        req.quantity = MAX_QUANTITY;
        assert!(validate_movement(&req).is_ok());
        req.quantity = Decimal::new(100_000_000_000_000, 0);
        assert_eq!(field_of(validate_movement(&req).unwrap_err()), "quantity");
        req.quantity = Decimal::MAX;
        assert_eq!(field_of(validate_movement(&req).unwrap_err()), "quantity");
    }

    #[test]
    fn test_non_positive_ids_rejected() {
        let mut req = request("IN", None, Some(1));
        req.product_id = 0;
        assert_eq!(field_of(validate_movement(&req).unwrap_err()), "productId");

        let err = validate_movement(&request("OUT", Some(-2), None)).unwrap_err();
        assert_eq!(field_of(err), "fromLocationId");
    }

    #[test]
    fn test_reason_is_trimmed() {
        assert_eq!(normalize_reason(Some("  broken pallet ")), Some("broken pallet".to_string()));
        assert_eq!(normalize_reason(Some("   ")), None);
        assert_eq!(normalize_reason(None), None);
    }

    // ========================================================================
    // Product Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_new_product() {
        let product =
            validate_new_product(Some(" CEM-53 "), Some("Cement"), Some("Bags"), Some(50.9)).unwrap();
        assert_eq!(product.sku_code, "CEM-53");
        assert_eq!(product.reorder_level, 50);

        assert!(validate_new_product(None, Some("Cement"), Some("Bags"), None).is_err());
        assert!(validate_new_product(Some("X"), Some("  "), Some("Bags"), None).is_err());
        assert!(validate_new_product(Some("X"), Some("Y"), Some("Bags"), Some(-1.0)).is_err());
    }

    #[test]
    fn test_product_changes_require_a_field() {
        assert!(validate_product_changes(None, None, None).is_err());
        assert!(validate_product_changes(Some(""), None, None).is_err());
        let changes = validate_product_changes(None, Some(" Tons "), Some(5.0)).unwrap();
        assert_eq!(changes.unit.as_deref(), Some("Tons"));
        assert_eq!(changes.reorder_level, Some(5));
        assert_eq!(changes.name, None);
    }

    #[test]
    fn test_parse_reorder_level() {
        assert_eq!(parse_reorder_level(""), Some(0));
        assert_eq!(parse_reorder_level("12"), Some(12));
        assert_eq!(parse_reorder_level("7.8"), Some(7));
        assert_eq!(parse_reorder_level("-1"), None);
        assert_eq!(parse_reorder_level("abc"), None);
        assert_eq!(parse_reorder_level("inf"), None);
    }

    #[test]
    fn test_unit_or_default() {
        assert_eq!(unit_or_default(None), "Units");
        assert_eq!(unit_or_default(Some(" ")), "Units");
        assert_eq!(unit_or_default(Some("Bags")), "Bags");
    }

    // ========================================================================
    // Query Parameter Tests
    // ========================================================================

    #[test]
    fn test_parse_dead_days() {
        assert_eq!(parse_dead_days(None, 60), Ok(60));
        assert_eq!(parse_dead_days(Some("30"), 60), Ok(30));
        assert_eq!(parse_dead_days(Some("14.9"), 60), Ok(14));
        assert!(parse_dead_days(Some("0"), 60).is_err());
        assert!(parse_dead_days(Some("soon"), 60).is_err());
    }

    #[test]
    fn test_parse_page_params() {
        assert_eq!(parse_page_limit(None), Ok(None));
        assert_eq!(parse_page_limit(Some("20")), Ok(Some(20)));
        assert!(parse_page_limit(Some("-5")).is_err());
        assert_eq!(parse_cursor(Some("42")), Ok(Some(42)));
        assert!(parse_cursor(Some("0")).is_err());
    }
}
