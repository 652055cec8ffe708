//! Movement ledger pagination tests

use rust_decimal::Decimal;
use shared::ledger::{record_movement, MovementLog};
use shared::memory::MemoryStore;
use shared::{validate_movement, MovementRequest, NewProduct, PageRequest};

async fn store_with_movements(count: i64) -> MemoryStore {
    let store = MemoryStore::new();
    let product = store
        .create_product(NewProduct {
            sku_code: "SKU-PAGE".to_string(),
            name: "Paged".to_string(),
            unit: "Units".to_string(),
            reorder_level: 0,
        })
        .unwrap();
    let location = store.create_location("Main").unwrap();

    for _ in 0..count {
        let movement = validate_movement(&MovementRequest {
            product_id: product.id,
            movement_type: "IN".to_string(),
            quantity: Decimal::ONE,
            from_location_id: None,
            to_location_id: Some(location.id),
            reason: None,
        })
        .unwrap();
        record_movement(&store, &movement).await.unwrap();
    }
    store
}

#[tokio::test]
async fn test_walk_cursor_over_five_movements() {
    let store = store_with_movements(5).await;

    let first = store
        .movements_page(PageRequest::new(Some(2), None))
        .await
        .unwrap();
    let ids: Vec<i64> = first.items.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![5, 4]);
    assert_eq!(first.next_cursor, Some(4));

    let second = store
        .movements_page(PageRequest::new(Some(2), first.next_cursor))
        .await
        .unwrap();
    let ids: Vec<i64> = second.items.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![3, 2]);
    assert_eq!(second.next_cursor, Some(2));

    let third = store
        .movements_page(PageRequest::new(Some(2), second.next_cursor))
        .await
        .unwrap();
    let ids: Vec<i64> = third.items.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1]);
    assert_eq!(third.next_cursor, None);
}

#[tokio::test]
async fn test_exact_page_has_no_cursor() {
    let store = store_with_movements(3).await;

    let page = store
        .movements_page(PageRequest::new(Some(3), None))
        .await
        .unwrap();
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.next_cursor, None);
}

#[tokio::test]
async fn test_empty_ledger() {
    let store = MemoryStore::new();
    let page = store.movements_page(PageRequest::default()).await.unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.next_cursor, None);
}
