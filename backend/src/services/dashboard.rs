//! Inventory dashboard service
//!
//! Reads balances joined with their latest movement and hands them to the
//! shared health deriver. Reads are plain read-committed queries without
//! row locks.

use shared::health::{self, InventoryReader};
use sqlx::PgPool;

use crate::error::AppResult;
use crate::models::{BalanceRow, BalanceSnapshot, InventoryAlerts, InventoryHealthRow};

const SNAPSHOT_QUERY: &str = r#"
    SELECT s.product_id, s.location_id, s.quantity, s.updated_at,
           p.sku_code, p.name AS product_name, p.unit, p.reorder_level,
           l.name AS location_name,
           lm.last_movement_at
    FROM stock s
    JOIN products p ON p.id = s.product_id
    JOIN locations l ON l.id = s.location_id
    LEFT JOIN LATERAL (
        SELECT MAX(m.created_at) AS last_movement_at
        FROM stock_movements m
        WHERE m.product_id = s.product_id
          AND (m.from_location_id = s.location_id OR m.to_location_id = s.location_id)
    ) lm ON TRUE
    WHERE ($1::BIGINT IS NULL OR s.product_id = $1)
      AND ($2::BIGINT IS NULL OR s.location_id = $2)
    ORDER BY p.sku_code ASC, l.name ASC
"#;

/// Service deriving inventory health for the dashboard and exports
#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
    dead_days: i64,
}

impl DashboardService {
    /// Create a new DashboardService with the configured dead stock threshold
    pub fn new(db: PgPool, dead_days: i64) -> Self {
        Self { db, dead_days }
    }

    /// Threshold to use when the caller does not supply one
    pub fn default_dead_days(&self) -> i64 {
        self.dead_days
    }

    async fn snapshots(
        &self,
        product_id: Option<i64>,
        location_id: Option<i64>,
    ) -> AppResult<Vec<BalanceSnapshot>> {
        let rows = sqlx::query_as::<_, BalanceRow>(SNAPSHOT_QUERY)
            .bind(product_id)
            .bind(location_id)
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(BalanceSnapshot::from).collect())
    }

    /// Health row for every balance
    pub async fn inventory_health(&self, dead_days: i64) -> AppResult<Vec<InventoryHealthRow>> {
        health::list_inventory_health(self, dead_days).await
    }

    /// Low and dead balances
    pub async fn alerts(&self, dead_days: i64) -> AppResult<InventoryAlerts> {
        health::list_alerts(self, dead_days).await
    }
}

impl InventoryReader for DashboardService {
    type Error = crate::error::AppError;

    async fn balance_snapshots(&self) -> AppResult<Vec<BalanceSnapshot>> {
        self.snapshots(None, None).await
    }

    async fn balance_snapshot(
        &self,
        product_id: i64,
        location_id: i64,
    ) -> AppResult<Option<BalanceSnapshot>> {
        let mut rows = self.snapshots(Some(product_id), Some(location_id)).await?;
        Ok(rows.pop())
    }
}
