//! Stock balance models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{LocationSummary, ProductSummary};

/// Balance of one product at one location, joined with both summaries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockRow {
    pub product: ProductSummary,
    pub location: LocationSummary,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    pub updated_at: DateTime<Utc>,
}

/// A balance row with the timestamp of the latest movement touching it
///
/// This is the raw input of the inventory health deriver.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceSnapshot {
    pub product: ProductSummary,
    pub location: LocationSummary,
    pub quantity: Decimal,
    pub updated_at: DateTime<Utc>,
    /// Latest movement for this product where the location is either side
    pub last_movement_at: Option<DateTime<Utc>>,
}
