//! In-memory implementation of the ledger and inventory traits
//!
//! Transactions work on a private copy of the data and publish it on
//! commit. A commit fails with a conflict if another transaction committed
//! in between, which gives serializable behavior without holding a lock
//! across awaits. Dropping a transaction discards its copy.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::{LedgerError, LedgerResult};
use crate::health::InventoryReader;
use crate::ledger::{LedgerStore, LedgerTx, MovementLog};
use crate::models::{
    BalanceSnapshot, Location, NewMovement, NewProduct, Product, StockMovement,
};
use crate::types::{CursorPage, PageRequest};
use crate::validation::{balance_out_of_range, MAX_QUANTITY};

#[derive(Debug, Clone)]
struct BalanceEntry {
    quantity: Decimal,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
struct MemoryData {
    products: BTreeMap<i64, Product>,
    locations: BTreeMap<i64, Location>,
    balances: BTreeMap<(i64, i64), BalanceEntry>,
    movements: Vec<StockMovement>,
}

impl MemoryData {
    fn next_id<V>(map: &BTreeMap<i64, V>) -> i64 {
        map.keys().next_back().map_or(1, |id| id + 1)
    }

    fn snapshot(&self, product_id: i64, location_id: i64) -> Option<BalanceSnapshot> {
        let entry = self.balances.get(&(product_id, location_id))?;
        let product = self.products.get(&product_id)?;
        let location = self.locations.get(&location_id)?;
        let last_movement_at = self
            .movements
            .iter()
            .filter(|m| m.product_id == product_id && m.touches(location_id))
            .map(|m| m.created_at)
            .max();

        Some(BalanceSnapshot {
            product: product.summary(),
            location: location.summary(),
            quantity: entry.quantity,
            updated_at: entry.updated_at,
            last_movement_at,
        })
    }
}

#[derive(Debug, Default)]
struct Versioned {
    version: u64,
    data: MemoryData,
}

/// Shared in-memory store; clones share the same data
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Versioned>>,
}

fn lock(inner: &Mutex<Versioned>) -> LedgerResult<MutexGuard<'_, Versioned>> {
    inner
        .lock()
        .map_err(|_| LedgerError::Storage("memory store lock poisoned".to_string()))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a product; duplicate SKU codes are rejected
    pub fn create_product(&self, product: NewProduct) -> LedgerResult<Product> {
        let mut state = lock(&self.inner)?;
        if state
            .data
            .products
            .values()
            .any(|p| p.sku_code == product.sku_code)
        {
            return Err(LedgerError::Conflict {
                resource: "skuCode".to_string(),
                message: "skuCode must be unique".to_string(),
            });
        }

        let now = Utc::now();
        let product = Product {
            id: MemoryData::next_id(&state.data.products),
            sku_code: product.sku_code,
            name: product.name,
            unit: product.unit,
            reorder_level: product.reorder_level,
            created_at: now,
            updated_at: now,
        };
        state.data.products.insert(product.id, product.clone());
        state.version += 1;
        Ok(product)
    }

    pub fn create_location(&self, name: &str) -> LedgerResult<Location> {
        let mut state = lock(&self.inner)?;
        let location = Location {
            id: MemoryData::next_id(&state.data.locations),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        state.data.locations.insert(location.id, location.clone());
        state.version += 1;
        Ok(location)
    }

    /// Balance of a pair, zero when no row exists
    pub fn balance(&self, product_id: i64, location_id: i64) -> LedgerResult<Decimal> {
        let state = lock(&self.inner)?;
        Ok(state
            .data
            .balances
            .get(&(product_id, location_id))
            .map_or(Decimal::ZERO, |b| b.quantity))
    }

    /// Whether a balance row exists for the pair
    pub fn has_balance_row(&self, product_id: i64, location_id: i64) -> LedgerResult<bool> {
        let state = lock(&self.inner)?;
        Ok(state.data.balances.contains_key(&(product_id, location_id)))
    }

    /// Every ledger entry in append order
    pub fn movements(&self) -> LedgerResult<Vec<StockMovement>> {
        let state = lock(&self.inner)?;
        Ok(state.data.movements.clone())
    }
}

/// A transaction over a private copy of the store
#[derive(Debug)]
pub struct MemoryTx {
    inner: Arc<Mutex<Versioned>>,
    base_version: u64,
    data: MemoryData,
}

impl LedgerStore for MemoryStore {
    type Error = LedgerError;
    type Tx = MemoryTx;

    async fn begin(&self) -> LedgerResult<MemoryTx> {
        let state = lock(&self.inner)?;
        Ok(MemoryTx {
            inner: Arc::clone(&self.inner),
            base_version: state.version,
            data: state.data.clone(),
        })
    }
}

impl LedgerTx for MemoryTx {
    type Error = LedgerError;

    async fn product(&mut self, id: i64) -> LedgerResult<Option<Product>> {
        Ok(self.data.products.get(&id).cloned())
    }

    async fn location(&mut self, id: i64) -> LedgerResult<Option<Location>> {
        Ok(self.data.locations.get(&id).cloned())
    }

    async fn balance_for_update(&mut self, product_id: i64, location_id: i64) -> LedgerResult<Decimal> {
        Ok(self
            .data
            .balances
            .get(&(product_id, location_id))
            .map_or(Decimal::ZERO, |b| b.quantity))
    }

    async fn upsert_balance(
        &mut self,
        product_id: i64,
        location_id: i64,
        quantity: Decimal,
    ) -> LedgerResult<()> {
        self.data.balances.insert(
            (product_id, location_id),
            BalanceEntry {
                quantity,
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn credit_balance(
        &mut self,
        product_id: i64,
        location_id: i64,
        quantity: Decimal,
    ) -> LedgerResult<Decimal> {
        let entry = self
            .data
            .balances
            .entry((product_id, location_id))
            .or_insert(BalanceEntry {
                quantity: Decimal::ZERO,
                updated_at: Utc::now(),
            });
        let next = entry
            .quantity
            .checked_add(quantity)
            .filter(|next| *next <= MAX_QUANTITY)
            .ok_or_else(balance_out_of_range)?;
        entry.quantity = next;
        entry.updated_at = Utc::now();
        Ok(next)
    }

    async fn append_movement(&mut self, movement: &NewMovement) -> LedgerResult<StockMovement> {
        let id = self.data.movements.last().map_or(1, |m| m.id + 1);
        let movement = StockMovement {
            id,
            product_id: movement.product_id,
            from_location_id: movement.from_location_id,
            to_location_id: movement.to_location_id,
            quantity: movement.quantity,
            movement_type: movement.movement_type,
            reason: movement.reason.clone(),
            created_at: Utc::now(),
        };
        self.data.movements.push(movement.clone());
        Ok(movement)
    }

    async fn commit(self) -> LedgerResult<()> {
        let mut state = lock(&self.inner)?;
        if state.version != self.base_version {
            return Err(LedgerError::Conflict {
                resource: "stock".to_string(),
                message: "concurrent modification, transaction aborted".to_string(),
            });
        }
        state.data = self.data;
        state.version += 1;
        Ok(())
    }
}

impl InventoryReader for MemoryStore {
    type Error = LedgerError;

    async fn balance_snapshots(&self) -> LedgerResult<Vec<BalanceSnapshot>> {
        let state = lock(&self.inner)?;
        let mut rows: Vec<BalanceSnapshot> = state
            .data
            .balances
            .keys()
            .filter_map(|(p, l)| state.data.snapshot(*p, *l))
            .collect();
        rows.sort_by(|a, b| {
            a.product
                .sku_code
                .cmp(&b.product.sku_code)
                .then_with(|| a.location.name.cmp(&b.location.name))
        });
        Ok(rows)
    }

    async fn balance_snapshot(
        &self,
        product_id: i64,
        location_id: i64,
    ) -> LedgerResult<Option<BalanceSnapshot>> {
        let state = lock(&self.inner)?;
        Ok(state.data.snapshot(product_id, location_id))
    }
}

impl MovementLog for MemoryStore {
    type Error = LedgerError;

    async fn movements_page(&self, page: PageRequest) -> LedgerResult<CursorPage<StockMovement>> {
        let state = lock(&self.inner)?;
        let rows: Vec<StockMovement> = state
            .data
            .movements
            .iter()
            .rev()
            .filter(|m| page.cursor.map_or(true, |cursor| m.id < cursor))
            .take(page.fetch_limit() as usize)
            .cloned()
            .collect();
        Ok(CursorPage::from_overfetch(rows, page, |m| m.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(store: &MemoryStore, sku: &str) -> LedgerResult<Product> {
        store.create_product(NewProduct {
            sku_code: sku.to_string(),
            name: "Widget".to_string(),
            unit: "Units".to_string(),
            reorder_level: 0,
        })
    }

    #[test]
    fn test_duplicate_sku_rejected() {
        let store = MemoryStore::new();
        product(&store, "SKU-1").unwrap();
        let err = product(&store, "SKU-1").unwrap_err();
        assert!(matches!(err, LedgerError::Conflict { .. }));
    }

    #[test]
    fn test_commit_publishes_changes() {
        let store = MemoryStore::new();
        let p = product(&store, "SKU-1").unwrap();
        let l = store.create_location("Main").unwrap();

        tokio_test::block_on(async {
            let mut tx = store.begin().await.unwrap();
            let balance = tx.credit_balance(p.id, l.id, Decimal::from(7)).await.unwrap();
            assert_eq!(balance, Decimal::from(7));
            assert_eq!(store.balance(p.id, l.id).unwrap(), Decimal::ZERO);
            tx.commit().await.unwrap();
        });

        assert_eq!(store.balance(p.id, l.id).unwrap(), Decimal::from(7));
    }

    #[test]
    fn test_credit_past_maximum_is_rejected() {
        let store = MemoryStore::new();
        let p = product(&store, "SKU-1").unwrap();
        let l = store.create_location("Main").unwrap();

        tokio_test::block_on(async {
            let mut tx = store.begin().await.unwrap();
            tx.credit_balance(p.id, l.id, MAX_QUANTITY).await.unwrap();
            let err = tx.credit_balance(p.id, l.id, Decimal::ONE).await.unwrap_err();
            assert!(matches!(err, LedgerError::Validation { ref field, .. } if field == "quantity"));

            let err = tx.credit_balance(p.id, l.id, Decimal::MAX).await.unwrap_err();
            assert!(matches!(err, LedgerError::Validation { .. }));
            assert_eq!(tx.balance_for_update(p.id, l.id).await.unwrap(), MAX_QUANTITY);
        });
    }

    #[test]
    fn test_snapshot_tracks_last_touching_movement() {
        let store = MemoryStore::new();
        let p = product(&store, "SKU-1").unwrap();
        let a = store.create_location("A").unwrap();
        let b = store.create_location("B").unwrap();

        let snapshot = tokio_test::block_on(async {
            let mut tx = store.begin().await.unwrap();
            tx.credit_balance(p.id, a.id, Decimal::ONE).await.unwrap();
            tx.upsert_balance(p.id, b.id, Decimal::ZERO).await.unwrap();
            tx.append_movement(&NewMovement {
                product_id: p.id,
                from_location_id: None,
                to_location_id: Some(a.id),
                quantity: Decimal::ONE,
                movement_type: crate::models::MovementType::In,
                reason: None,
            })
            .await
            .unwrap();
            tx.commit().await.unwrap();

            (
                store.balance_snapshot(p.id, a.id).await.unwrap(),
                store.balance_snapshot(p.id, b.id).await.unwrap(),
            )
        });

        assert!(snapshot.0.and_then(|s| s.last_movement_at).is_some());
        assert_eq!(snapshot.1.and_then(|s| s.last_movement_at), None);
    }
}
