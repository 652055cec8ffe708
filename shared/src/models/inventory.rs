//! Derived inventory health models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{LocationSummary, ProductSummary};

/// Days without movement after which a balance is considered dead stock
pub const DEFAULT_DEAD_DAYS: i64 = 60;

/// Health classification of a (product, location) balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InventoryStatus {
    Healthy,
    Low,
    Dead,
}

impl InventoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryStatus::Healthy => "HEALTHY",
            InventoryStatus::Low => "LOW",
            InventoryStatus::Dead => "DEAD",
        }
    }

    /// Short badge label shown in listings
    pub fn label(&self) -> &'static str {
        match self {
            InventoryStatus::Healthy => "OK",
            InventoryStatus::Low => "LOW",
            InventoryStatus::Dead => "DEAD",
        }
    }
}

impl std::fmt::Display for InventoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A balance enriched with recency and status; never persisted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryHealthRow {
    pub product: ProductSummary,
    pub location: LocationSummary,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    /// `None` when no movement has touched the pair yet
    pub last_movement_at: Option<DateTime<Utc>>,
    pub days_idle: i64,
    pub status: InventoryStatus,
}

/// Rows needing attention, split by status
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InventoryAlerts {
    pub low: Vec<InventoryHealthRow>,
    pub dead: Vec<InventoryHealthRow>,
}

/// Health rows of the locations touched by a movement
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AffectedInventory {
    pub from: Option<InventoryHealthRow>,
    pub to: Option<InventoryHealthRow>,
}
