//! Product catalogue models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unit assigned to products imported without one
pub const DEFAULT_UNIT: &str = "Units";

/// A stocked product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    /// Unique stock keeping unit code, immutable after creation
    pub sku_code: String,
    pub name: String,
    /// Unit of measure (e.g., "Bags", "Tons")
    pub unit: String,
    /// Quantity at or below which the product is considered low
    pub reorder_level: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn summary(&self) -> ProductSummary {
        ProductSummary {
            id: self.id,
            sku_code: self.sku_code.clone(),
            name: self.name.clone(),
            unit: self.unit.clone(),
            reorder_level: self.reorder_level,
        }
    }
}

/// Product fields embedded in stock and health rows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: i64,
    pub sku_code: String,
    pub name: String,
    pub unit: String,
    pub reorder_level: i32,
}

/// A validated product ready to be inserted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub sku_code: String,
    pub name: String,
    pub unit: String,
    pub reorder_level: i32,
}

/// A validated partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub reorder_level: Option<i32>,
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.unit.is_none() && self.reorder_level.is_none()
    }
}
