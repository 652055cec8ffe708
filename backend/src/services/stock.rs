//! Raw stock balance listing

use sqlx::PgPool;

use crate::error::AppResult;
use crate::models::{BalanceRow, StockRow};

/// Service for reading stock balances
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Every balance row with its product and location, by product then location id
    pub async fn list_stock(&self) -> AppResult<Vec<StockRow>> {
        let rows = sqlx::query_as::<_, BalanceRow>(
            r#"
            SELECT s.product_id, s.location_id, s.quantity, s.updated_at,
                   p.sku_code, p.name AS product_name, p.unit, p.reorder_level,
                   l.name AS location_name,
                   NULL::TIMESTAMPTZ AS last_movement_at
            FROM stock s
            JOIN products p ON p.id = s.product_id
            JOIN locations l ON l.id = s.location_id
            ORDER BY s.product_id ASC, s.location_id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(StockRow::from).collect())
    }
}
