//! Database models for the Stockroom server
//!
//! Re-exports models from the shared crate and adds the row types the
//! queries decode into

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

pub use shared::models::*;

use crate::error::AppError;

/// Columns selected for a product
pub const PRODUCT_COLUMNS: &str = "id, sku_code, name, unit, reorder_level, created_at, updated_at";

/// Columns selected for a ledger entry
pub const MOVEMENT_COLUMNS: &str =
    "id, product_id, from_location_id, to_location_id, quantity, movement_type, reason, created_at";

#[derive(Debug, FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub sku_code: String,
    pub name: String,
    pub unit: String,
    pub reorder_level: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            sku_code: row.sku_code,
            name: row.name,
            unit: row.unit,
            reorder_level: row.reorder_level,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct LocationRow {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Location {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct MovementRow {
    pub id: i64,
    pub product_id: i64,
    pub from_location_id: Option<i64>,
    pub to_location_id: Option<i64>,
    pub quantity: Decimal,
    pub movement_type: String,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<MovementRow> for StockMovement {
    type Error = AppError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        let movement_type = row
            .movement_type
            .parse::<MovementType>()
            .map_err(|e| AppError::Internal(format!("stock_movements row {}: {}", row.id, e)))?;

        Ok(StockMovement {
            id: row.id,
            product_id: row.product_id,
            from_location_id: row.from_location_id,
            to_location_id: row.to_location_id,
            quantity: row.quantity,
            movement_type,
            reason: row.reason,
            created_at: row.created_at,
        })
    }
}

/// Balance joined with product, location and its latest movement
#[derive(Debug, FromRow)]
pub struct BalanceRow {
    pub product_id: i64,
    pub location_id: i64,
    pub quantity: Decimal,
    pub updated_at: DateTime<Utc>,
    pub sku_code: String,
    pub product_name: String,
    pub unit: String,
    pub reorder_level: i32,
    pub location_name: String,
    pub last_movement_at: Option<DateTime<Utc>>,
}

impl BalanceRow {
    fn product(&self) -> ProductSummary {
        ProductSummary {
            id: self.product_id,
            sku_code: self.sku_code.clone(),
            name: self.product_name.clone(),
            unit: self.unit.clone(),
            reorder_level: self.reorder_level,
        }
    }

    fn location(&self) -> LocationSummary {
        LocationSummary {
            id: self.location_id,
            name: self.location_name.clone(),
        }
    }
}

impl From<BalanceRow> for BalanceSnapshot {
    fn from(row: BalanceRow) -> Self {
        BalanceSnapshot {
            product: row.product(),
            location: row.location(),
            quantity: row.quantity,
            updated_at: row.updated_at,
            last_movement_at: row.last_movement_at,
        }
    }
}

impl From<BalanceRow> for StockRow {
    fn from(row: BalanceRow) -> Self {
        StockRow {
            product: row.product(),
            location: row.location(),
            quantity: row.quantity,
            updated_at: row.updated_at,
        }
    }
}
