//! Stock movement service
//!
//! PostgreSQL implementation of the ledger storage seam. A movement runs
//! in one transaction: the touched rows are locked with `SELECT ... FOR
//! UPDATE` in location order, credits are a single atomic upsert, and the
//! ledger row is appended before commit. Dropping [`PgLedgerTx`] rolls back.

use rust_decimal::Decimal;
use shared::health::InventoryReader;
use shared::ledger::{self, LedgerStore, LedgerTx, MovementLog};
use shared::{balance_out_of_range, validate_movement, CursorPage, PageRequest};
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{AppError, AppResult};
use crate::models::{
    BalanceSnapshot, Location, LocationRow, MovementRequest, MovementResult, MovementRow,
    NewMovement, Product, ProductRow, StockMovement, MOVEMENT_COLUMNS, PRODUCT_COLUMNS,
};
use crate::services::dashboard::DashboardService;

/// Lock not available
const LOCK_NOT_AVAILABLE: &str = "55P03";
/// Statement timeout
const QUERY_CANCELED: &str = "57014";
/// Deadlock detected
const DEADLOCK_DETECTED: &str = "40P01";
/// Numeric value out of range
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Client-facing error for a SQLSTATE raised while writing stock, if any
fn stock_write_error(code: &str) -> Option<AppError> {
    match code {
        LOCK_NOT_AVAILABLE | QUERY_CANCELED | DEADLOCK_DETECTED => Some(AppError::Conflict {
            resource: "stock".to_string(),
            message: "stock is busy, try again".to_string(),
        }),
        NUMERIC_VALUE_OUT_OF_RANGE => Some(balance_out_of_range().into()),
        _ => None,
    }
}

/// Map lock waits that ran out of time onto a retryable conflict and
/// balances past the column range onto a validation error
fn map_stock_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if let Some(mapped) = db_err.code().as_deref().and_then(stock_write_error) {
            tracing::warn!(error = %db_err, "Stock write aborted: {}", mapped);
            return mapped;
        }
    }
    AppError::DatabaseError(err)
}

/// Ledger storage backed by PostgreSQL
///
/// Post-commit health reads go through the dashboard queries.
#[derive(Clone)]
pub struct PgLedger {
    db: PgPool,
    transaction_timeout_ms: u64,
    inventory: DashboardService,
}

/// One open movement transaction
pub struct PgLedgerTx {
    tx: Transaction<'static, Postgres>,
}

impl PgLedger {
    pub fn new(db: PgPool, transaction_timeout_ms: u64, dead_days: i64) -> Self {
        Self {
            inventory: DashboardService::new(db.clone(), dead_days),
            db,
            transaction_timeout_ms,
        }
    }
}

impl LedgerStore for PgLedger {
    type Error = AppError;
    type Tx = PgLedgerTx;

    async fn begin(&self) -> AppResult<PgLedgerTx> {
        let mut tx = self.db.begin().await?;

        // SET LOCAL does not accept bind parameters; the value is a plain integer
        let timeout = self.transaction_timeout_ms;
        sqlx::query(&format!("SET LOCAL statement_timeout = {timeout}"))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!("SET LOCAL lock_timeout = {timeout}"))
            .execute(&mut *tx)
            .await?;

        Ok(PgLedgerTx { tx })
    }
}

impl LedgerTx for PgLedgerTx {
    type Error = AppError;

    async fn product(&mut self, id: i64) -> AppResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn location(&mut self, id: i64) -> AppResult<Option<Location>> {
        let row = sqlx::query_as::<_, LocationRow>(
            "SELECT id, name, created_at FROM locations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(Location::from))
    }

    async fn balance_for_update(&mut self, product_id: i64, location_id: i64) -> AppResult<Decimal> {
        let quantity: Option<Decimal> = sqlx::query_scalar(
            r#"
            SELECT quantity FROM stock
            WHERE product_id = $1 AND location_id = $2
            FOR UPDATE
            "#,
        )
        .bind(product_id)
        .bind(location_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_stock_error)?;

        Ok(quantity.unwrap_or(Decimal::ZERO))
    }

    async fn upsert_balance(
        &mut self,
        product_id: i64,
        location_id: i64,
        quantity: Decimal,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stock (product_id, location_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (product_id, location_id)
            DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = NOW()
            "#,
        )
        .bind(product_id)
        .bind(location_id)
        .bind(quantity)
        .execute(&mut *self.tx)
        .await
        .map_err(map_stock_error)?;

        Ok(())
    }

    async fn credit_balance(
        &mut self,
        product_id: i64,
        location_id: i64,
        quantity: Decimal,
    ) -> AppResult<Decimal> {
        let balance: Decimal = sqlx::query_scalar(
            r#"
            INSERT INTO stock (product_id, location_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (product_id, location_id)
            DO UPDATE SET quantity = stock.quantity + EXCLUDED.quantity, updated_at = NOW()
            RETURNING quantity
            "#,
        )
        .bind(product_id)
        .bind(location_id)
        .bind(quantity)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_stock_error)?;

        Ok(balance)
    }

    async fn append_movement(&mut self, movement: &NewMovement) -> AppResult<StockMovement> {
        let row = sqlx::query_as::<_, MovementRow>(&format!(
            r#"
            INSERT INTO stock_movements
                (product_id, from_location_id, to_location_id, quantity, movement_type, reason)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {MOVEMENT_COLUMNS}
            "#
        ))
        .bind(movement.product_id)
        .bind(movement.from_location_id)
        .bind(movement.to_location_id)
        .bind(movement.quantity)
        .bind(movement.movement_type.as_str())
        .bind(&movement.reason)
        .fetch_one(&mut *self.tx)
        .await?;

        StockMovement::try_from(row)
    }

    async fn commit(self) -> AppResult<()> {
        self.tx.commit().await.map_err(map_stock_error)
    }
}

impl MovementLog for PgLedger {
    type Error = AppError;

    async fn movements_page(&self, page: PageRequest) -> AppResult<CursorPage<StockMovement>> {
        let rows = sqlx::query_as::<_, MovementRow>(&format!(
            r#"
            SELECT {MOVEMENT_COLUMNS}
            FROM stock_movements
            WHERE ($1::BIGINT IS NULL OR id < $1)
            ORDER BY id DESC
            LIMIT $2
            "#
        ))
        .bind(page.cursor)
        .bind(page.fetch_limit())
        .fetch_all(&self.db)
        .await?;

        let movements = rows
            .into_iter()
            .map(StockMovement::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(CursorPage::from_overfetch(movements, page, |m| m.id))
    }
}

impl InventoryReader for PgLedger {
    type Error = AppError;

    async fn balance_snapshots(&self) -> AppResult<Vec<BalanceSnapshot>> {
        self.inventory.balance_snapshots().await
    }

    async fn balance_snapshot(
        &self,
        product_id: i64,
        location_id: i64,
    ) -> AppResult<Option<BalanceSnapshot>> {
        self.inventory.balance_snapshot(product_id, location_id).await
    }
}

/// Service for recording and listing stock movements
#[derive(Clone)]
pub struct StockMovementService {
    ledger: PgLedger,
    dead_days: i64,
}

impl StockMovementService {
    /// Create a new StockMovementService instance
    pub fn new(db: PgPool, transaction_timeout_ms: u64, dead_days: i64) -> Self {
        Self {
            ledger: PgLedger::new(db, transaction_timeout_ms, dead_days),
            dead_days,
        }
    }

    /// Record a movement atomically and report the affected inventory
    pub async fn record_movement(&self, request: MovementRequest) -> AppResult<MovementResult> {
        let movement = validate_movement(&request).map_err(|err| {
            tracing::debug!(error = %err, "Movement rejected by validation");
            AppError::from(err)
        })?;

        let result = ledger::record_movement_with_inventory(&self.ledger, &movement, self.dead_days)
            .await
            .map_err(|err| {
                if let AppError::InsufficientStock { .. } = err {
                    tracing::warn!(
                        product_id = movement.product_id,
                        movement_type = %movement.movement_type(),
                        quantity = %movement.quantity,
                        "Movement rejected: {}",
                        err
                    );
                }
                err
            })?;

        tracing::info!(
            movement_id = result.movement.id,
            product_id = movement.product_id,
            movement_type = %movement.movement_type(),
            quantity = %movement.quantity,
            "Stock movement recorded"
        );

        Ok(result)
    }

    /// Newest-first page of the movement ledger
    pub async fn list_movements(&self, page: PageRequest) -> AppResult<CursorPage<StockMovement>> {
        self.ledger.movements_page(page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_waits_map_to_conflict() {
        for code in ["55P03", "57014", "40P01"] {
            assert!(matches!(
                stock_write_error(code),
                Some(AppError::Conflict { ref resource, .. }) if resource == "stock"
            ));
        }
    }

    #[test]
    fn test_numeric_overflow_maps_to_validation() {
        assert!(matches!(
            stock_write_error("22003"),
            Some(AppError::Validation { ref field, .. }) if field == "quantity"
        ));
    }

    #[test]
    fn test_other_codes_stay_database_errors() {
        assert!(stock_write_error("23505").is_none());
        assert!(stock_write_error("23514").is_none());
    }
}
