//! Stock movement ledger models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::AffectedInventory;

/// Kind of stock movement recorded in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementType {
    /// Goods received into a location
    In,
    /// Goods issued from a location
    Out,
    /// Goods written off at a location
    Damage,
    /// Goods moved between two locations
    Transfer,
}

impl MovementType {
    pub const ALL: [MovementType; 4] = [
        MovementType::In,
        MovementType::Out,
        MovementType::Damage,
        MovementType::Transfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "IN",
            MovementType::Out => "OUT",
            MovementType::Damage => "DAMAGE",
            MovementType::Transfer => "TRANSFER",
        }
    }

    /// Whether the movement takes stock out of its `from` location
    pub fn decrements(&self) -> bool {
        !matches!(self, MovementType::In)
    }

    /// Whether the movement puts stock into its `to` location
    pub fn increments(&self) -> bool {
        matches!(self, MovementType::In | MovementType::Transfer)
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MovementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MovementType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown movement type '{}'", s))
    }
}

/// An immutable ledger entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: i64,
    pub product_id: i64,
    pub from_location_id: Option<i64>,
    pub to_location_id: Option<i64>,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl StockMovement {
    /// Whether this entry touches the given location on either side
    pub fn touches(&self, location_id: i64) -> bool {
        self.from_location_id == Some(location_id) || self.to_location_id == Some(location_id)
    }
}

/// Raw movement request as received from a client
///
/// The type is kept as a string so that unknown values surface as
/// validation errors instead of deserialization failures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovementRequest {
    pub product_id: i64,
    #[serde(rename = "type")]
    pub movement_type: String,
    pub quantity: Decimal,
    #[serde(default)]
    pub from_location_id: Option<i64>,
    #[serde(default)]
    pub to_location_id: Option<i64>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Location shape of a validated movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementKind {
    In { to: i64 },
    Out { from: i64 },
    Damage { from: i64 },
    Transfer { from: i64, to: i64 },
}

impl MovementKind {
    pub fn movement_type(&self) -> MovementType {
        match self {
            MovementKind::In { .. } => MovementType::In,
            MovementKind::Out { .. } => MovementType::Out,
            MovementKind::Damage { .. } => MovementType::Damage,
            MovementKind::Transfer { .. } => MovementType::Transfer,
        }
    }

    pub fn from_location(&self) -> Option<i64> {
        match *self {
            MovementKind::In { .. } => None,
            MovementKind::Out { from } | MovementKind::Damage { from } => Some(from),
            MovementKind::Transfer { from, .. } => Some(from),
        }
    }

    pub fn to_location(&self) -> Option<i64> {
        match *self {
            MovementKind::In { to } | MovementKind::Transfer { to, .. } => Some(to),
            MovementKind::Out { .. } | MovementKind::Damage { .. } => None,
        }
    }
}

/// A movement whose shape has been checked; produced by
/// [`crate::validation::validate_movement`]
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedMovement {
    pub product_id: i64,
    pub kind: MovementKind,
    pub quantity: Decimal,
    pub reason: Option<String>,
}

impl ValidatedMovement {
    pub fn movement_type(&self) -> MovementType {
        self.kind.movement_type()
    }

    pub fn from_location(&self) -> Option<i64> {
        self.kind.from_location()
    }

    pub fn to_location(&self) -> Option<i64> {
        self.kind.to_location()
    }

    /// The ledger row to append for this movement
    pub fn to_new_movement(&self) -> NewMovement {
        NewMovement {
            product_id: self.product_id,
            from_location_id: self.from_location(),
            to_location_id: self.to_location(),
            quantity: self.quantity,
            movement_type: self.movement_type(),
            reason: self.reason.clone(),
        }
    }
}

/// Ledger row waiting to be appended
#[derive(Debug, Clone, PartialEq)]
pub struct NewMovement {
    pub product_id: i64,
    pub from_location_id: Option<i64>,
    pub to_location_id: Option<i64>,
    pub quantity: Decimal,
    pub movement_type: MovementType,
    pub reason: Option<String>,
}

/// Post-movement balances of the affected locations
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MovementBalances {
    #[serde(with = "rust_decimal::serde::float_option")]
    pub from: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub to: Option<Decimal>,
}

/// Outcome of the atomic part of a movement
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedMovement {
    pub movement: StockMovement,
    pub balances: MovementBalances,
}

/// Full response for a recorded movement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovementResult {
    pub movement: StockMovement,
    pub balances: MovementBalances,
    pub inventory: AffectedInventory,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_movement_wire_format() {
        let movement = StockMovement {
            id: 7,
            product_id: 3,
            from_location_id: Some(1),
            to_location_id: Some(2),
            quantity: Decimal::new(125, 1),
            movement_type: MovementType::Transfer,
            reason: None,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
        };

        let json = serde_json::to_value(&movement).unwrap();
        assert_eq!(json["type"], "TRANSFER");
        assert_eq!(json["productId"], 3);
        assert_eq!(json["fromLocationId"], 1);
        assert_eq!(json["quantity"], 12.5);
        assert!(json["reason"].is_null());
    }

    #[test]
    fn test_request_accepts_unknown_type_as_text() {
        let request: MovementRequest = serde_json::from_str(
            r#"{"productId": 1, "type": "LOAN", "quantity": 2, "toLocationId": 4}"#,
        )
        .unwrap();
        assert_eq!(request.movement_type, "LOAN");
        assert_eq!(request.quantity, Decimal::from(2));
        assert_eq!(request.from_location_id, None);
    }
}
