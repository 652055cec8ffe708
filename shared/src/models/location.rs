//! Storage location models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A place where stock is held (warehouse, site, shelf...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Location {
    pub fn summary(&self) -> LocationSummary {
        LocationSummary {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Location fields embedded in stock and health rows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LocationSummary {
    pub id: i64,
    pub name: String,
}
