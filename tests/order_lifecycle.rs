//! Order lifecycle integration tests against the in-memory database:
//! checkout stock accounting, draft pricing, cancellation and the status
//! state machine.

mod common;

use rust_decimal::Decimal;

use storefront_server::db::models::{OrderItemInput, OrderOwner, OrderStatus, Role};
use storefront_server::db::repository::OrderRepository;
use storefront_server::orders::{DraftPayload, OrderEngine, OrderError, PaymentInput};

use common::*;

#[tokio::test]
async fn registered_checkout_reserves_stock() {
    let db = memory_db().await;
    let product = seed_product(&db, "Widget", Decimal::new(50, 0), 10).await;
    let user = seed_user(&db, "Alice", "alice@example.com", Role::Customer).await;
    let engine = OrderEngine::new(db.clone());

    let order = engine
        .create_registered(user.id.clone().unwrap(), checkout(&[(&product, 3)]))
        .await
        .expect("checkout succeeds");

    assert_eq!(order.status, OrderStatus::Processing);
    assert!(order.stock_reserved);
    assert!(!order.is_paid);
    assert_eq!(order.order_items.len(), 1);
    assert_eq!(stock_of(&db, &product).await, 7);
}

#[tokio::test]
async fn registered_owner_round_trips_through_the_store() {
    let db = memory_db().await;
    let product = seed_product(&db, "Widget", Decimal::new(50, 0), 10).await;
    let user = seed_user(&db, "Alice", "alice@example.com", Role::Customer).await;
    let engine = OrderEngine::new(db.clone());

    let order = engine
        .create_registered(user.id.clone().unwrap(), checkout(&[(&product, 1)]))
        .await
        .expect("registered checkout persists");

    // Reload from the store: the owner variant must survive serialization
    let reloaded = OrderRepository::new(db.clone())
        .find_by_id(&order.id.as_ref().unwrap().to_string())
        .await
        .expect("order lookup")
        .expect("order exists");
    assert_eq!(
        reloaded.owner,
        Some(OrderOwner::Registered {
            user: user.id.clone().unwrap()
        })
    );
}

#[tokio::test]
async fn insufficient_stock_rejected_before_any_decrement() {
    let db = memory_db().await;
    let plenty = seed_product(&db, "Plenty", Decimal::new(10, 0), 5).await;
    let scarce = seed_product(&db, "Scarce", Decimal::new(20, 0), 1).await;
    let user = seed_user(&db, "Alice", "alice@example.com", Role::Customer).await;
    let engine = OrderEngine::new(db.clone());

    let err = engine
        .create_registered(
            user.id.clone().unwrap(),
            checkout(&[(&plenty, 2), (&scarce, 2)]),
        )
        .await
        .expect_err("second item exceeds stock");
    assert!(matches!(err, OrderError::InsufficientStock(name) if name == "Scarce"));

    // Nothing was decremented and no order was persisted
    assert_eq!(stock_of(&db, &plenty).await, 5);
    assert_eq!(stock_of(&db, &scarce).await, 1);
    assert!(engine.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_checkout_is_rejected() {
    let db = memory_db().await;
    let user = seed_user(&db, "Alice", "alice@example.com", Role::Customer).await;
    let engine = OrderEngine::new(db.clone());

    let mut payload = checkout(&[]);
    payload.order_items.clear();
    let err = engine
        .create_registered(user.id.clone().unwrap(), payload)
        .await
        .expect_err("empty order");
    assert!(matches!(err, OrderError::EmptyOrder));
}

#[tokio::test]
async fn guest_checkout_rejects_bad_email_before_product_lookup() {
    let db = memory_db().await;
    let engine = OrderEngine::new(db.clone());

    // The item references a product that does not exist; a bad email must
    // fail first, so the error is InvalidEmail rather than ProductNotFound.
    let payload = storefront_server::orders::CheckoutPayload {
        order_items: vec![OrderItemInput {
            product: "product:does_not_exist".to_string(),
            name: "Ghost".to_string(),
            image: "/images/ghost.jpg".to_string(),
            price: Decimal::new(10, 0),
            qty: 1,
        }],
        shipping_address: shipping_address(),
        payment_method: "PayPal".to_string(),
        tax_price: Decimal::ZERO,
        shipping_price: Decimal::ZERO,
        total_price: Decimal::new(10, 0),
    };

    let err = engine
        .create_guest(Some("bad-email".to_string()), payload.clone())
        .await
        .expect_err("invalid email");
    assert!(matches!(err, OrderError::InvalidEmail));

    let err = engine
        .create_guest(None, payload)
        .await
        .expect_err("missing email");
    assert!(matches!(err, OrderError::InvalidEmail));
}

#[tokio::test]
async fn guest_checkout_records_guest_owner() {
    let db = memory_db().await;
    let product = seed_product(&db, "Widget", Decimal::new(50, 0), 10).await;
    let engine = OrderEngine::new(db.clone());

    let order = engine
        .create_guest(Some("guest@example.com".to_string()), checkout(&[(&product, 1)]))
        .await
        .expect("guest checkout");

    let owner = order.owner.expect("guest owner recorded");
    assert_eq!(owner.guest_email(), Some("guest@example.com"));
    assert_eq!(stock_of(&db, &product).await, 9);
}

#[tokio::test]
async fn draft_prices_come_from_the_catalog() {
    let db = memory_db().await;
    let a = seed_product(&db, "Alpha", Decimal::new(50, 0), 10).await;
    let b = seed_product(&db, "Beta", Decimal::new(60, 0), 10).await;
    let engine = OrderEngine::new(db.clone());

    let order = engine
        .create_draft(DraftPayload {
            order_items: vec![
                OrderItemInput {
                    product: a.id.as_ref().unwrap().to_string(),
                    name: a.name.clone(),
                    image: a.image.clone(),
                    // Client-supplied price is ignored for drafts
                    price: Decimal::ONE,
                    qty: 1,
                },
                OrderItemInput {
                    product: b.id.as_ref().unwrap().to_string(),
                    name: b.name.clone(),
                    image: b.image.clone(),
                    price: Decimal::ONE,
                    qty: 1,
                },
            ],
            email: None,
        })
        .await
        .expect("draft created");

    // 110 items, 15% tax, free shipping over the 100 threshold
    assert_eq!(order.items_price(), Decimal::new(110, 0));
    assert_eq!(order.tax_price, Decimal::new(165, 1));
    assert_eq!(order.shipping_price, Decimal::ZERO);
    assert_eq!(order.total_price, Decimal::new(1265, 1));
    assert_eq!(order.status, OrderStatus::Draft);
    assert!(!order.stock_reserved);

    // Drafts never touch stock
    assert_eq!(stock_of(&db, &a).await, 10);
    assert_eq!(stock_of(&db, &b).await, 10);
}

#[tokio::test]
async fn draft_below_threshold_pays_flat_shipping() {
    let db = memory_db().await;
    let product = seed_product(&db, "Cheap", Decimal::new(40, 0), 10).await;
    let engine = OrderEngine::new(db.clone());

    let order = engine
        .create_draft(DraftPayload {
            order_items: vec![OrderItemInput {
                product: product.id.as_ref().unwrap().to_string(),
                name: product.name.clone(),
                image: product.image.clone(),
                price: product.price,
                qty: 1,
            }],
            email: None,
        })
        .await
        .expect("draft created");

    assert_eq!(order.tax_price, Decimal::new(6, 0));
    assert_eq!(order.shipping_price, Decimal::new(10, 0));
    assert_eq!(order.total_price, Decimal::new(56, 0));
}

#[tokio::test]
async fn cancel_restocks_exactly_once() {
    let db = memory_db().await;
    let product = seed_product(&db, "Widget", Decimal::new(50, 0), 10).await;
    let user = seed_user(&db, "Alice", "alice@example.com", Role::Customer).await;
    let engine = OrderEngine::new(db.clone());

    let order = engine
        .create_registered(user.id.clone().unwrap(), checkout(&[(&product, 3)]))
        .await
        .unwrap();
    assert_eq!(stock_of(&db, &product).await, 7);

    let order_id = order.id.as_ref().unwrap().to_string();
    let cancelled = engine
        .cancel(&order_id, &as_caller(&user))
        .await
        .expect("owner cancels");
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert!(!cancelled.stock_reserved);
    assert_eq!(stock_of(&db, &product).await, 10);

    // Terminal: a second cancel must not restock again
    let err = engine
        .cancel(&order_id, &as_caller(&user))
        .await
        .expect_err("already cancelled");
    assert!(matches!(err, OrderError::InvalidStatusTransition { .. }));
    assert_eq!(stock_of(&db, &product).await, 10);
}

#[tokio::test]
async fn cancelling_a_draft_does_not_restock() {
    let db = memory_db().await;
    let product = seed_product(&db, "Widget", Decimal::new(50, 0), 10).await;
    let engine = OrderEngine::new(db.clone());

    let draft = engine
        .create_draft(DraftPayload {
            order_items: vec![OrderItemInput {
                product: product.id.as_ref().unwrap().to_string(),
                name: product.name.clone(),
                image: product.image.clone(),
                price: product.price,
                qty: 4,
            }],
            email: None,
        })
        .await
        .unwrap();

    let order_id = draft.id.as_ref().unwrap().to_string();
    let cancelled = engine
        .cancel(&order_id, &admin_caller())
        .await
        .expect("admin cancels draft");
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(stock_of(&db, &product).await, 10);
}

#[tokio::test]
async fn cancel_is_rejected_after_delivery() {
    let db = memory_db().await;
    let product = seed_product(&db, "Widget", Decimal::new(50, 0), 10).await;
    let user = seed_user(&db, "Alice", "alice@example.com", Role::Customer).await;
    let engine = OrderEngine::new(db.clone());

    let order = engine
        .create_registered(user.id.clone().unwrap(), checkout(&[(&product, 1)]))
        .await
        .unwrap();
    let order_id = order.id.as_ref().unwrap().to_string();

    engine.set_status(&order_id, OrderStatus::Shipped).await.unwrap();
    engine.mark_delivered(&order_id).await.unwrap();

    let err = engine
        .cancel(&order_id, &admin_caller())
        .await
        .expect_err("delivered orders stay delivered");
    assert!(matches!(err, OrderError::AlreadyDelivered));
    assert_eq!(stock_of(&db, &product).await, 9);
}

#[tokio::test]
async fn cancel_requires_owner_or_admin() {
    let db = memory_db().await;
    let product = seed_product(&db, "Widget", Decimal::new(50, 0), 10).await;
    let owner = seed_user(&db, "Alice", "alice@example.com", Role::Customer).await;
    let other = seed_user(&db, "Mallory", "mallory@example.com", Role::Customer).await;
    let engine = OrderEngine::new(db.clone());

    let order = engine
        .create_registered(owner.id.clone().unwrap(), checkout(&[(&product, 1)]))
        .await
        .unwrap();
    let order_id = order.id.as_ref().unwrap().to_string();

    let err = engine
        .cancel(&order_id, &as_caller(&other))
        .await
        .expect_err("stranger cannot cancel");
    assert!(matches!(err, OrderError::Unauthorized));
    assert_eq!(stock_of(&db, &product).await, 9);
}

#[tokio::test]
async fn status_machine_blocks_skipping_ahead() {
    let db = memory_db().await;
    let product = seed_product(&db, "Widget", Decimal::new(50, 0), 10).await;
    let user = seed_user(&db, "Alice", "alice@example.com", Role::Customer).await;
    let engine = OrderEngine::new(db.clone());

    let order = engine
        .create_registered(user.id.clone().unwrap(), checkout(&[(&product, 1)]))
        .await
        .unwrap();
    let order_id = order.id.as_ref().unwrap().to_string();

    // Processing -> Delivered skips Shipped
    let err = engine
        .set_status(&order_id, OrderStatus::Delivered)
        .await
        .expect_err("cannot skip shipped");
    assert!(matches!(err, OrderError::InvalidStatusTransition { .. }));

    // Re-asserting the current status is a no-op
    let same = engine
        .set_status(&order_id, OrderStatus::Processing)
        .await
        .unwrap();
    assert_eq!(same.status, OrderStatus::Processing);

    let shipped = engine
        .set_status(&order_id, OrderStatus::Shipped)
        .await
        .unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);

    let delivered = engine
        .set_status(&order_id, OrderStatus::Delivered)
        .await
        .unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);
    assert!(delivered.is_delivered);
    assert!(delivered.delivered_at.is_some());
}

#[tokio::test]
async fn shipping_address_is_frozen_once_paid() {
    let db = memory_db().await;
    let product = seed_product(&db, "Widget", Decimal::new(50, 0), 10).await;
    let user = seed_user(&db, "Alice", "alice@example.com", Role::Customer).await;
    let engine = OrderEngine::new(db.clone());

    let order = engine
        .create_registered(user.id.clone().unwrap(), checkout(&[(&product, 1)]))
        .await
        .unwrap();
    let order_id = order.id.as_ref().unwrap().to_string();

    let mut new_address = shipping_address();
    new_address.city = "Shelbyville".to_string();
    let updated = engine
        .update_shipping(&order_id, new_address.clone())
        .await
        .expect("unpaid orders are editable");
    assert_eq!(updated.shipping_address.unwrap().city, "Shelbyville");

    let paid = engine
        .mark_paid(
            &order_id,
            PaymentInput {
                id: "PAY-123".to_string(),
                status: "COMPLETED".to_string(),
                update_time: "2026-01-01T00:00:00Z".to_string(),
                email_address: "alice@example.com".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(paid.is_paid);
    assert!(paid.paid_at.is_some());
    assert_eq!(paid.payment_result.unwrap().id, "PAY-123");

    let err = engine
        .update_shipping(&order_id, new_address)
        .await
        .expect_err("paid orders are frozen");
    assert!(matches!(err, OrderError::OrderAlreadyPaid));
}

#[tokio::test]
async fn my_orders_lists_only_the_callers_orders() {
    let db = memory_db().await;
    let product = seed_product(&db, "Widget", Decimal::new(50, 0), 10).await;
    let alice = seed_user(&db, "Alice", "alice@example.com", Role::Customer).await;
    let bob = seed_user(&db, "Bob", "bob@example.com", Role::Customer).await;
    let engine = OrderEngine::new(db.clone());

    engine
        .create_registered(alice.id.clone().unwrap(), checkout(&[(&product, 1)]))
        .await
        .unwrap();
    engine
        .create_registered(alice.id.clone().unwrap(), checkout(&[(&product, 1)]))
        .await
        .unwrap();
    engine
        .create_registered(bob.id.clone().unwrap(), checkout(&[(&product, 1)]))
        .await
        .unwrap();

    let mine = engine.my_orders(alice.id.as_ref().unwrap()).await.unwrap();
    assert_eq!(mine.len(), 2);
    let all = engine.list_all().await.unwrap();
    assert_eq!(all.len(), 3);
}
