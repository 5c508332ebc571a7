//! OrderStore and RmaStore contract tests.

use chrono::Duration;
use reman_portal::models::{
    NewDeliveryEvent, NewOrder, NewOrderItem, NewRma, NewRmaItem, NewRmaRequestLog, OrderStatus,
    OrderUpdate, RequestLogStatus, RmaLogUpdate, RmaStatus, RmaUpdate,
};
use reman_portal::storage::helpers::now;
use reman_portal::storage::{Storage, StorageError};
use serde_json::json;

use super::{make_order, make_user, unique};

fn order_item(name: &str, serial: Option<String>) -> NewOrderItem {
    NewOrderItem {
        product_name: name.to_string(),
        sku: Some("SKU-1".to_string()),
        serial_number: serial,
        quantity: 2,
        unit_price_cents: 12_500,
        warranty_months: 24,
    }
}

fn new_rma(user_id: i64, order_id: Option<i64>) -> NewRma {
    NewRma {
        rma_number: unique("RMA"),
        user_id,
        order_id,
        status: RmaStatus::Submitted,
        contact_name: "Contact".to_string(),
        contact_email: "contact@example.com".to_string(),
        contact_phone: None,
        reason: "Dead on arrival".to_string(),
        notes: None,
    }
}

// =============================================================================
// OrderStore
// =============================================================================

pub async fn test_order_round_trip<S: Storage>(store: &S) {
    let user = make_user(store).await;
    let order = make_order(store, user.id).await;

    assert_eq!(store.get_order(order.id).await.unwrap(), Some(order.clone()));
    assert_eq!(
        store.find_order_by_number(&order.order_number).await.unwrap(),
        Some(order.clone())
    );
    assert!(store.get_order(i64::MAX).await.unwrap().is_none());
}

pub async fn test_order_number_unique<S: Storage>(store: &S) {
    let user = make_user(store).await;
    let order = make_order(store, user.id).await;
    let result = store
        .create_order(NewOrder {
            order_number: order.order_number.clone(),
            user_id: user.id,
            status: OrderStatus::Pending,
            order_date: now(),
            total_cents: 0,
            currency: "USD".to_string(),
            shipping_address: None,
            tracking_number: None,
            notes: None,
        })
        .await;
    assert!(matches!(result, Err(StorageError::Conflict(_))));
}

pub async fn test_orders_for_user_newest_first<S: Storage>(store: &S) {
    let user = make_user(store).await;
    let other = make_user(store).await;
    let older = store
        .create_order(NewOrder {
            order_number: unique("ORD"),
            user_id: user.id,
            status: OrderStatus::Delivered,
            order_date: now() - Duration::days(30),
            total_cents: 10,
            currency: "EUR".to_string(),
            shipping_address: Some("1 Main St".to_string()),
            tracking_number: Some("TRK".to_string()),
            notes: None,
        })
        .await
        .unwrap();
    let newer = make_order(store, user.id).await;
    make_order(store, other.id).await;

    let ids: Vec<i64> = store
        .list_orders_for_user(user.id)
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.id)
        .collect();
    assert_eq!(ids, vec![newer.id, older.id]);
}

pub async fn test_update_order_partial<S: Storage>(store: &S) {
    let user = make_user(store).await;
    let order = make_order(store, user.id).await;
    let updated = store
        .update_order(
            order.id,
            OrderUpdate {
                status: Some(OrderStatus::Shipped),
                tracking_number: Some("1Z999".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Shipped);
    assert_eq!(updated.tracking_number.as_deref(), Some("1Z999"));
    assert_eq!(updated.total_cents, order.total_cents);

    assert!(matches!(
        store.update_order(i64::MAX, OrderUpdate::default()).await,
        Err(StorageError::NotFound)
    ));
}

pub async fn test_order_items_and_serial_lookup<S: Storage>(store: &S) {
    let user = make_user(store).await;
    let order = make_order(store, user.id).await;
    let serial = unique("SN");

    let first = store
        .add_order_item(order.id, order_item("Laptop", Some(serial.clone())))
        .await
        .unwrap();
    let second = store
        .add_order_item(order.id, order_item("Charger", None))
        .await
        .unwrap();
    assert_eq!(first.warranty_months, 24);

    let items = store.list_order_items(order.id).await.unwrap();
    assert_eq!(
        items.iter().map(|i| i.id).collect::<Vec<_>>(),
        vec![first.id, second.id]
    );

    let found = store.find_order_item_by_serial(&serial).await.unwrap().unwrap();
    assert_eq!(found, first);
    assert!(store
        .find_order_item_by_serial(&unique("SN"))
        .await
        .unwrap()
        .is_none());
}

pub async fn test_item_for_missing_order_fails<S: Storage>(store: &S) {
    let result = store
        .add_order_item(i64::MAX, order_item("Orphan", None))
        .await;
    assert!(result.is_err(), "item without an order must be rejected");
}

pub async fn test_timeline_ordered_by_occurrence<S: Storage>(store: &S) {
    let user = make_user(store).await;
    let order = make_order(store, user.id).await;
    let base = now();

    for (stage, offset) in [("delivered", 2), ("picked", 0), ("in_transit", 1)] {
        store
            .add_timeline_event(NewDeliveryEvent {
                order_id: order.id,
                stage: stage.to_string(),
                description: None,
                occurred_at: base + Duration::hours(offset),
            })
            .await
            .unwrap();
    }

    let stages: Vec<String> = store
        .list_timeline(order.id)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.stage)
        .collect();
    assert_eq!(stages, vec!["picked", "in_transit", "delivered"]);
}

pub async fn test_delete_order_cascades<S: Storage>(store: &S) {
    let user = make_user(store).await;
    let order = make_order(store, user.id).await;
    let serial = unique("SN");
    store
        .add_order_item(order.id, order_item("Phone", Some(serial.clone())))
        .await
        .unwrap();
    let rma = store.create_rma(new_rma(user.id, Some(order.id))).await.unwrap();

    store.delete_order(order.id).await.unwrap();

    assert!(store.get_order(order.id).await.unwrap().is_none());
    assert!(store.list_order_items(order.id).await.unwrap().is_empty());
    assert!(store.find_order_item_by_serial(&serial).await.unwrap().is_none());
    let detached = store.get_rma(rma.id).await.unwrap().unwrap();
    assert_eq!(detached.order_id, None);
    assert!(matches!(
        store.delete_order(order.id).await,
        Err(StorageError::NotFound)
    ));
}

// =============================================================================
// RmaStore
// =============================================================================

pub async fn test_rma_round_trip<S: Storage>(store: &S) {
    let user = make_user(store).await;
    let rma = store.create_rma(new_rma(user.id, None)).await.unwrap();

    assert_eq!(rma.status, RmaStatus::Submitted);
    assert_eq!(store.get_rma(rma.id).await.unwrap(), Some(rma.clone()));
    assert_eq!(
        store.find_rma_by_number(&rma.rma_number).await.unwrap(),
        Some(rma.clone())
    );

    let dup = store
        .create_rma(NewRma {
            rma_number: rma.rma_number.clone(),
            ..new_rma(user.id, None)
        })
        .await;
    assert!(matches!(dup, Err(StorageError::Conflict(_))));

    let updated = store
        .update_rma(
            rma.id,
            RmaUpdate {
                status: Some(RmaStatus::InRepair),
                notes: Some("bench 4".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, RmaStatus::InRepair);
    assert_eq!(updated.notes.as_deref(), Some("bench 4"));
    assert_eq!(updated.reason, rma.reason);
}

pub async fn test_rmas_for_user<S: Storage>(store: &S) {
    let user = make_user(store).await;
    let other = make_user(store).await;
    let first = store.create_rma(new_rma(user.id, None)).await.unwrap();
    let second = store.create_rma(new_rma(user.id, None)).await.unwrap();
    store.create_rma(new_rma(other.id, None)).await.unwrap();

    let ids: Vec<i64> = store
        .list_rmas_for_user(user.id)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

pub async fn test_rma_items<S: Storage>(store: &S) {
    let user = make_user(store).await;
    let rma = store.create_rma(new_rma(user.id, None)).await.unwrap();
    let item = store
        .add_rma_item(
            rma.id,
            NewRmaItem {
                product_name: "Tablet".to_string(),
                serial_number: Some("TAB-1".to_string()),
                fault_description: "cracked screen".to_string(),
                quantity: 1,
            },
        )
        .await
        .unwrap();
    assert_eq!(store.list_rma_items(rma.id).await.unwrap(), vec![item.clone()]);

    store.delete_rma_item(item.id).await.unwrap();
    assert!(store.list_rma_items(rma.id).await.unwrap().is_empty());
    assert!(matches!(
        store.delete_rma_item(item.id).await,
        Err(StorageError::NotFound)
    ));
}

pub async fn test_rma_log_lifecycle<S: Storage>(store: &S) {
    let user = make_user(store).await;
    let rma = store.create_rma(new_rma(user.id, None)).await.unwrap();
    let payload = json!({"rma_number": rma.rma_number, "items": [{"product_name": "Tablet"}]});

    let log = store
        .create_rma_log(NewRmaRequestLog {
            rma_id: rma.id,
            user_id: user.id,
            payload: payload.clone(),
            status: RequestLogStatus::Submitted,
        })
        .await
        .unwrap();
    assert_eq!(log.payload, payload);
    assert_eq!(log.webhook_status, None);
    assert!(!log.email_notified);

    let updated = store
        .update_rma_log(
            log.id,
            RmaLogUpdate {
                webhook_status: Some(503),
                email_notified: Some(true),
                notification_error: Some("webhook returned 503".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, RequestLogStatus::Submitted);
    assert_eq!(updated.webhook_status, Some(503));
    assert!(updated.email_notified);
    assert_eq!(store.get_rma_log(log.id).await.unwrap(), Some(updated));
    assert!(store
        .list_rma_logs()
        .await
        .unwrap()
        .iter()
        .any(|l| l.id == log.id));
}

pub async fn test_delete_rma_cascades<S: Storage>(store: &S) {
    let user = make_user(store).await;
    let rma = store.create_rma(new_rma(user.id, None)).await.unwrap();
    store
        .add_rma_item(
            rma.id,
            NewRmaItem {
                product_name: "Drone".to_string(),
                serial_number: None,
                fault_description: "no power".to_string(),
                quantity: 1,
            },
        )
        .await
        .unwrap();
    let log = store
        .create_rma_log(NewRmaRequestLog {
            rma_id: rma.id,
            user_id: user.id,
            payload: json!({}),
            status: RequestLogStatus::Submitted,
        })
        .await
        .unwrap();

    store.delete_rma(rma.id).await.unwrap();
    assert!(store.get_rma(rma.id).await.unwrap().is_none());
    assert!(store.list_rma_items(rma.id).await.unwrap().is_empty());
    assert!(store.get_rma_log(log.id).await.unwrap().is_none());
    assert!(matches!(
        store.delete_rma(rma.id).await,
        Err(StorageError::NotFound)
    ));
}

/// Run all order and RMA contract tests.
#[macro_export]
macro_rules! run_order_tests {
    ($store:expr) => {
        use $crate::storage::order_tests::*;

        test_order_round_trip($store).await;
        println!("  test_order_round_trip: PASSED");

        test_order_number_unique($store).await;
        println!("  test_order_number_unique: PASSED");

        test_orders_for_user_newest_first($store).await;
        println!("  test_orders_for_user_newest_first: PASSED");

        test_update_order_partial($store).await;
        println!("  test_update_order_partial: PASSED");

        test_order_items_and_serial_lookup($store).await;
        println!("  test_order_items_and_serial_lookup: PASSED");

        test_item_for_missing_order_fails($store).await;
        println!("  test_item_for_missing_order_fails: PASSED");

        test_timeline_ordered_by_occurrence($store).await;
        println!("  test_timeline_ordered_by_occurrence: PASSED");

        test_delete_order_cascades($store).await;
        println!("  test_delete_order_cascades: PASSED");

        test_rma_round_trip($store).await;
        println!("  test_rma_round_trip: PASSED");

        test_rmas_for_user($store).await;
        println!("  test_rmas_for_user: PASSED");

        test_rma_items($store).await;
        println!("  test_rma_items: PASSED");

        test_rma_log_lifecycle($store).await;
        println!("  test_rma_log_lifecycle: PASSED");

        test_delete_rma_cascades($store).await;
        println!("  test_delete_rma_cascades: PASSED");
    };
}
