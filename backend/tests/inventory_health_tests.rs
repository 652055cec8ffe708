//! Inventory health tests
//!
//! Status derivation over the in-memory store:
//! - LOW when the balance is at or below the reorder level
//! - DEAD when idle longer than the threshold, checked before LOW
//! - reads are repeatable without intervening movements

use chrono::{Duration, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::health::{derive_status, inventory_health_at, list_alerts, list_inventory_health};
use shared::ledger::record_movement;
use shared::memory::MemoryStore;
use shared::{validate_movement, InventoryStatus, MovementRequest, NewProduct};

fn product(store: &MemoryStore, sku: &str, reorder_level: i32) -> i64 {
    store
        .create_product(NewProduct {
            sku_code: sku.to_string(),
            name: format!("Product {}", sku),
            unit: "Units".to_string(),
            reorder_level,
        })
        .unwrap()
        .id
}

async fn stock_in(store: &MemoryStore, product_id: i64, location_id: i64, quantity: i64) {
    let movement = validate_movement(&MovementRequest {
        product_id,
        movement_type: "IN".to_string(),
        quantity: Decimal::from(quantity),
        from_location_id: None,
        to_location_id: Some(location_id),
        reason: Some("initial count".to_string()),
    })
    .unwrap();
    record_movement(store, &movement).await.unwrap();
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[tokio::test]
    async fn test_low_after_ten_idle_days() {
        let store = MemoryStore::new();
        let p = product(&store, "SKU-LOW", 50);
        let l = store.create_location("Main").unwrap().id;
        stock_in(&store, p, l, 40).await;

        let now = Utc::now() + Duration::days(10);
        let rows = inventory_health_at(&store, 60, now).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].days_idle, 10);
        assert_eq!(rows[0].status, InventoryStatus::Low);
        assert!(rows[0].last_movement_at.is_some());
    }

    #[tokio::test]
    async fn test_dead_wins_over_low() {
        let store = MemoryStore::new();
        let p = product(&store, "SKU-DEAD", 50);
        let l = store.create_location("Main").unwrap().id;
        stock_in(&store, p, l, 40).await;

        let now = Utc::now() + Duration::days(90);
        let rows = inventory_health_at(&store, 60, now).await.unwrap();

        assert_eq!(rows[0].days_idle, 90);
        assert_eq!(rows[0].status, InventoryStatus::Dead);
    }

    #[tokio::test]
    async fn test_healthy_above_reorder_level() {
        let store = MemoryStore::new();
        let p = product(&store, "SKU-OK", 10);
        let l = store.create_location("Main").unwrap().id;
        stock_in(&store, p, l, 11).await;

        let rows = list_inventory_health(&store, 60).await.unwrap();
        assert_eq!(rows[0].status, InventoryStatus::Healthy);
        assert_eq!(rows[0].days_idle, 0);
    }

    #[tokio::test]
    async fn test_rows_ordered_by_sku_then_location() {
        let store = MemoryStore::new();
        let b = product(&store, "B-200", 0);
        let a = product(&store, "A-100", 0);
        let north = store.create_location("North").unwrap().id;
        let east = store.create_location("East").unwrap().id;
        stock_in(&store, b, north, 1).await;
        stock_in(&store, a, north, 1).await;
        stock_in(&store, a, east, 1).await;

        let rows = list_inventory_health(&store, 60).await.unwrap();
        let keys: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.product.sku_code.as_str(), r.location.name.as_str()))
            .collect();

        assert_eq!(
            keys,
            vec![("A-100", "East"), ("A-100", "North"), ("B-200", "North")]
        );
    }

    #[tokio::test]
    async fn test_health_is_repeatable() {
        let store = MemoryStore::new();
        let p = product(&store, "SKU-1", 5);
        let l = store.create_location("Main").unwrap().id;
        stock_in(&store, p, l, 3).await;

        let now = Utc::now();
        let first = inventory_health_at(&store, 60, now).await.unwrap();
        let second = inventory_health_at(&store, 60, now).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_alerts_split_low_and_dead() {
        let store = MemoryStore::new();
        let low = product(&store, "SKU-LOW", 100);
        let ok = product(&store, "SKU-OK", 1);
        let l = store.create_location("Main").unwrap().id;
        stock_in(&store, low, l, 5).await;
        stock_in(&store, ok, l, 50).await;

        let alerts = list_alerts(&store, 60).await.unwrap();
        assert_eq!(alerts.low.len(), 1);
        assert_eq!(alerts.low[0].product.sku_code, "SKU-LOW");
        assert!(alerts.dead.is_empty());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Idle beyond the threshold is DEAD regardless of quantity
        #[test]
        fn prop_dead_has_priority(
            quantity in 0i64..1000,
            reorder_level in 0i32..1000,
            dead_days in 1i64..365,
            extra in 1i64..365
        ) {
            let status = derive_status(
                Decimal::from(quantity),
                reorder_level,
                dead_days + extra,
                dead_days,
            );
            prop_assert_eq!(status, InventoryStatus::Dead);
        }

        /// Within the threshold, LOW exactly when quantity <= reorder level
        #[test]
        fn prop_low_matches_reorder_level(
            quantity in 0i64..1000,
            reorder_level in 0i32..1000,
            dead_days in 1i64..365
        ) {
            let status = derive_status(Decimal::from(quantity), reorder_level, dead_days, dead_days);
            let expected = if quantity <= i64::from(reorder_level) {
                InventoryStatus::Low
            } else {
                InventoryStatus::Healthy
            };
            prop_assert_eq!(status, expected);
        }
    }
}
