//! Inventory health deriver
//!
//! Classifies every (product, location) balance as HEALTHY, LOW or DEAD.
//! Nothing here is persisted: rows are recomputed from balances and the
//! ledger on every read, so they cannot drift from the stored data.

use std::future::Future;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::LedgerError;
use crate::models::{BalanceSnapshot, InventoryAlerts, InventoryHealthRow, InventoryStatus};

/// Read-only access to balances joined with their latest movement
pub trait InventoryReader: Sync {
    type Error: From<LedgerError> + Send;

    /// All balances, ordered by SKU code then location name
    fn balance_snapshots(
        &self,
    ) -> impl Future<Output = Result<Vec<BalanceSnapshot>, Self::Error>> + Send;

    /// The balance of one pair, if a row exists
    fn balance_snapshot(
        &self,
        product_id: i64,
        location_id: i64,
    ) -> impl Future<Output = Result<Option<BalanceSnapshot>, Self::Error>> + Send;
}

/// Whole days elapsed between `last` and `now`, truncated toward zero
///
/// A timestamp in the future (clock skew between hosts) counts as zero.
pub fn days_idle(now: DateTime<Utc>, last: DateTime<Utc>) -> i64 {
    (now - last).num_days().max(0)
}

/// Status of a balance; the first matching rule wins
///
/// DEAD is checked before LOW, so an idle balance below its reorder level
/// still reports DEAD.
pub fn derive_status(
    quantity: Decimal,
    reorder_level: i32,
    days_idle: i64,
    dead_days: i64,
) -> InventoryStatus {
    if days_idle > dead_days {
        InventoryStatus::Dead
    } else if quantity <= Decimal::from(reorder_level) {
        InventoryStatus::Low
    } else {
        InventoryStatus::Healthy
    }
}

/// Enrich one snapshot with recency and status
pub fn build_health_row(
    snapshot: BalanceSnapshot,
    now: DateTime<Utc>,
    dead_days: i64,
) -> InventoryHealthRow {
    let last = snapshot.last_movement_at.unwrap_or(snapshot.updated_at);
    let days_idle = days_idle(now, last);
    let status = derive_status(
        snapshot.quantity,
        snapshot.product.reorder_level,
        days_idle,
        dead_days,
    );

    InventoryHealthRow {
        product: snapshot.product,
        location: snapshot.location,
        quantity: snapshot.quantity,
        last_movement_at: snapshot.last_movement_at,
        days_idle,
        status,
    }
}

/// Split health rows into the low and dead alert lists
pub fn split_alerts(rows: &[InventoryHealthRow]) -> InventoryAlerts {
    let pick = |status: InventoryStatus| {
        rows.iter()
            .filter(|r| r.status == status)
            .cloned()
            .collect::<Vec<_>>()
    };
    InventoryAlerts {
        low: pick(InventoryStatus::Low),
        dead: pick(InventoryStatus::Dead),
    }
}

/// Health of every balance as of `now`
pub async fn inventory_health_at<R: InventoryReader>(
    reader: &R,
    dead_days: i64,
    now: DateTime<Utc>,
) -> Result<Vec<InventoryHealthRow>, R::Error> {
    let snapshots = reader.balance_snapshots().await?;
    Ok(snapshots
        .into_iter()
        .map(|s| build_health_row(s, now, dead_days))
        .collect())
}

/// Health of every balance as of the current time
pub async fn list_inventory_health<R: InventoryReader>(
    reader: &R,
    dead_days: i64,
) -> Result<Vec<InventoryHealthRow>, R::Error> {
    inventory_health_at(reader, dead_days, Utc::now()).await
}

/// Low and dead rows as of the current time
pub async fn list_alerts<R: InventoryReader>(
    reader: &R,
    dead_days: i64,
) -> Result<InventoryAlerts, R::Error> {
    let rows = list_inventory_health(reader, dead_days).await?;
    Ok(split_alerts(&rows))
}

/// Health of a single pair, `None` when it has no balance row
pub async fn inventory_row<R: InventoryReader>(
    reader: &R,
    product_id: i64,
    location_id: i64,
    dead_days: i64,
) -> Result<Option<InventoryHealthRow>, R::Error> {
    let snapshot = reader.balance_snapshot(product_id, location_id).await?;
    Ok(snapshot.map(|s| build_health_row(s, Utc::now(), dead_days)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LocationSummary, ProductSummary};
    use chrono::Duration;

    fn snapshot(quantity: i64, reorder_level: i32, idle: Option<i64>, now: DateTime<Utc>) -> BalanceSnapshot {
        BalanceSnapshot {
            product: ProductSummary {
                id: 1,
                sku_code: "CEM-UT-53".to_string(),
                name: "UltraTech Cement 53 Grade".to_string(),
                unit: "Bags".to_string(),
                reorder_level,
            },
            location: LocationSummary {
                id: 1,
                name: "Main Warehouse".to_string(),
            },
            quantity: Decimal::from(quantity),
            updated_at: now - Duration::days(3),
            last_movement_at: idle.map(|d| now - Duration::days(d)),
        }
    }

    #[test]
    fn test_low_when_recent_and_below_reorder_level() {
        let now = Utc::now();
        let row = build_health_row(snapshot(40, 50, Some(10), now), now, 60);
        assert_eq!(row.days_idle, 10);
        assert_eq!(row.status, InventoryStatus::Low);
    }

    #[test]
    fn test_dead_takes_priority_over_low() {
        let now = Utc::now();
        let row = build_health_row(snapshot(40, 50, Some(90), now), now, 60);
        assert_eq!(row.days_idle, 90);
        assert_eq!(row.status, InventoryStatus::Dead);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        assert_eq!(derive_status(Decimal::from(100), 5, 60, 60), InventoryStatus::Healthy);
        assert_eq!(derive_status(Decimal::from(100), 5, 61, 60), InventoryStatus::Dead);
    }

    #[test]
    fn test_quantity_equal_to_reorder_level_is_low() {
        assert_eq!(derive_status(Decimal::from(5), 5, 0, 60), InventoryStatus::Low);
        assert_eq!(derive_status(Decimal::new(51, 1), 5, 0, 60), InventoryStatus::Healthy);
    }

    #[test]
    fn test_falls_back_to_balance_timestamp() {
        let now = Utc::now();
        let row = build_health_row(snapshot(500, 50, None, now), now, 60);
        assert_eq!(row.last_movement_at, None);
        assert_eq!(row.days_idle, 3);
        assert_eq!(row.status, InventoryStatus::Healthy);
    }

    #[test]
    fn test_partial_days_truncate() {
        let now = Utc::now();
        assert_eq!(days_idle(now, now - Duration::hours(47)), 1);
        assert_eq!(days_idle(now, now - Duration::hours(23)), 0);
        assert_eq!(days_idle(now, now + Duration::hours(30)), 0);
    }

    #[test]
    fn test_split_alerts() {
        let now = Utc::now();
        let rows = vec![
            build_health_row(snapshot(40, 50, Some(1), now), now, 60),
            build_health_row(snapshot(400, 50, Some(1), now), now, 60),
            build_health_row(snapshot(400, 50, Some(75), now), now, 60),
        ];
        let alerts = split_alerts(&rows);
        assert_eq!(alerts.low.len(), 1);
        assert_eq!(alerts.dead.len(), 1);
        assert_eq!(alerts.dead[0].days_idle, 75);
    }
}
