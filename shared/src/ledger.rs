//! Stock ledger engine
//!
//! Applies one stock movement as an atomic unit: balance mutation(s) plus
//! the ledger append. Storage is reached through [`LedgerStore`] and
//! [`LedgerTx`]; a transaction that is dropped without [`LedgerTx::commit`]
//! must roll back, so every early return below leaves storage untouched.

use std::future::Future;

use rust_decimal::Decimal;

use crate::error::LedgerError;
use crate::health::{self, InventoryReader};
use crate::models::{
    AffectedInventory, AppliedMovement, Location, MovementBalances, MovementResult, NewMovement,
    Product, StockMovement, ValidatedMovement,
};
use crate::types::{CursorPage, PageRequest};

/// A store able to open ledger transactions
pub trait LedgerStore: Sync {
    type Error: From<LedgerError> + Send;
    type Tx: LedgerTx<Error = Self::Error> + Send;

    /// Open a transaction; dropping it without commit rolls back
    fn begin(&self) -> impl Future<Output = Result<Self::Tx, Self::Error>> + Send;
}

/// Operations available inside one ledger transaction
pub trait LedgerTx {
    type Error: From<LedgerError> + Send;

    fn product(
        &mut self,
        id: i64,
    ) -> impl Future<Output = Result<Option<Product>, Self::Error>> + Send;

    fn location(
        &mut self,
        id: i64,
    ) -> impl Future<Output = Result<Option<Location>, Self::Error>> + Send;

    /// Current balance of the pair, zero when no row exists
    ///
    /// Implementations must lock the row until the transaction ends so
    /// that concurrent decrements of the same pair serialize.
    fn balance_for_update(
        &mut self,
        product_id: i64,
        location_id: i64,
    ) -> impl Future<Output = Result<Decimal, Self::Error>> + Send;

    /// Create or replace the balance of the pair
    fn upsert_balance(
        &mut self,
        product_id: i64,
        location_id: i64,
        quantity: Decimal,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Atomically add `quantity` to the pair, creating the row if needed,
    /// and return the new balance
    fn credit_balance(
        &mut self,
        product_id: i64,
        location_id: i64,
        quantity: Decimal,
    ) -> impl Future<Output = Result<Decimal, Self::Error>> + Send;

    fn append_movement(
        &mut self,
        movement: &NewMovement,
    ) -> impl Future<Output = Result<StockMovement, Self::Error>> + Send;

    fn commit(self) -> impl Future<Output = Result<(), Self::Error>> + Send
    where
        Self: Sized;
}

/// Read access to the movement ledger
pub trait MovementLog: Sync {
    type Error: From<LedgerError> + Send;

    /// Newest-first page of movements strictly below `page.cursor`
    fn movements_page(
        &self,
        page: PageRequest,
    ) -> impl Future<Output = Result<CursorPage<StockMovement>, Self::Error>> + Send;
}

/// Balance left after taking `quantity` out of `available`
pub fn debit(
    product_id: i64,
    location_id: i64,
    available: Decimal,
    quantity: Decimal,
) -> Result<Decimal, LedgerError> {
    let next = available - quantity;
    if next < Decimal::ZERO {
        return Err(LedgerError::InsufficientStock {
            product_id,
            location_id,
            available,
            requested: quantity,
        });
    }
    Ok(next)
}

/// Apply a validated movement inside an open transaction
///
/// Does not commit. On error the caller drops the transaction, discarding
/// any balance already written.
pub async fn apply_movement<T>(
    tx: &mut T,
    movement: &ValidatedMovement,
) -> Result<AppliedMovement, T::Error>
where
    T: LedgerTx + Send,
{
    let product_id = movement.product_id;

    if tx.product(product_id).await?.is_none() {
        return Err(LedgerError::not_found("Product").into());
    }
    if let Some(from) = movement.from_location() {
        if tx.location(from).await?.is_none() {
            return Err(LedgerError::not_found("fromLocationId").into());
        }
    }
    if let Some(to) = movement.to_location() {
        if tx.location(to).await?.is_none() {
            return Err(LedgerError::not_found("toLocationId").into());
        }
    }

    let mut balances = MovementBalances::default();

    let debited = match (movement.from_location(), movement.to_location()) {
        (Some(from), Some(to)) => Some((from, lock_pair(tx, product_id, from, to).await?)),
        (Some(from), None) => Some((from, tx.balance_for_update(product_id, from).await?)),
        (None, _) => None,
    };

    if let Some((from, available)) = debited {
        let next = debit(product_id, from, available, movement.quantity)?;
        tx.upsert_balance(product_id, from, next).await?;
        balances.from = Some(next);
    }

    if let Some(to) = movement.to_location() {
        let next = tx.credit_balance(product_id, to, movement.quantity).await?;
        balances.to = Some(next);
    }

    let movement = tx.append_movement(&movement.to_new_movement()).await?;

    Ok(AppliedMovement { movement, balances })
}

/// Lock both balances of a transfer in location id order and return the
/// balance at `from`
///
/// Two opposite transfers between the same locations then queue on the
/// same row instead of deadlocking.
async fn lock_pair<T>(
    tx: &mut T,
    product_id: i64,
    from: i64,
    to: i64,
) -> Result<Decimal, T::Error>
where
    T: LedgerTx + Send,
{
    if from < to {
        let available = tx.balance_for_update(product_id, from).await?;
        tx.balance_for_update(product_id, to).await?;
        Ok(available)
    } else {
        tx.balance_for_update(product_id, to).await?;
        tx.balance_for_update(product_id, from).await
    }
}

/// Record a movement in its own transaction: all or nothing
pub async fn record_movement<S>(
    store: &S,
    movement: &ValidatedMovement,
) -> Result<AppliedMovement, S::Error>
where
    S: LedgerStore,
{
    let mut tx = store.begin().await?;
    let applied = apply_movement(&mut tx, movement).await?;
    tx.commit().await?;
    Ok(applied)
}

/// Record a movement, then read the health rows of the locations it touched
///
/// The reads happen after commit and are advisory: a failed read is logged
/// and reported as `None`, never as a failure of the committed movement.
pub async fn record_movement_with_inventory<S>(
    store: &S,
    movement: &ValidatedMovement,
    dead_days: i64,
) -> Result<MovementResult, <S as LedgerStore>::Error>
where
    S: LedgerStore + InventoryReader,
    <S as InventoryReader>::Error: std::fmt::Display,
{
    let applied = record_movement(store, movement).await?;

    let inventory = AffectedInventory {
        from: affected_row(store, movement.product_id, movement.from_location(), dead_days).await,
        to: affected_row(store, movement.product_id, movement.to_location(), dead_days).await,
    };

    Ok(MovementResult {
        movement: applied.movement,
        balances: applied.balances,
        inventory,
    })
}

async fn affected_row<S>(
    store: &S,
    product_id: i64,
    location_id: Option<i64>,
    dead_days: i64,
) -> Option<crate::models::InventoryHealthRow>
where
    S: InventoryReader,
    S::Error: std::fmt::Display,
{
    let location_id = location_id?;
    match health::inventory_row(store, product_id, location_id, dead_days).await {
        Ok(row) => row,
        Err(err) => {
            tracing::warn!(
                product_id,
                location_id,
                error = %err,
                "Failed to read inventory row after movement"
            );
            None
        }
    }
}
