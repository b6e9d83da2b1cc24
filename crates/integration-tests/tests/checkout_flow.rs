//! Integration tests for checkout and order lifecycle.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;

use clementine_client::ApiError;
use clementine_core::{Address, NewOrder, OrderStatus, PaymentMethod, PaymentStatus};
use clementine_integration_tests::{TestApp, TestBackend, register_customer};

fn dec(units: i64, cents: u32) -> Decimal {
    Decimal::new(units * 100 + i64::from(cents), 2)
}

fn shipping() -> Address {
    Address {
        first_name: "Jo".to_owned(),
        last_name: "March".to_owned(),
        address: "1 Orchard Ln".to_owned(),
        city: "Concord".to_owned(),
        state: "MA".to_owned(),
        zip_code: "01742".to_owned(),
        country: "US".to_owned(),
    }
}

fn new_order() -> NewOrder {
    NewOrder {
        shipping_address: shipping(),
        billing_address: None,
        payment_method: PaymentMethod::CreditCard,
    }
}

// ============================================================================
// Guest-to-checkout flow
// ============================================================================

#[tokio::test]
async fn test_guest_cart_follows_login_through_checkout() {
    let backend = TestBackend::spawn().await;
    let clementines = backend
        .state
        .seed_product("Clementine Crate", "citrus", dec(10, 0), 50);

    let app = TestApp::connect(&backend);
    register_customer(&app, "jo@example.com").await;
    app.app.auth().logout();

    // Shop anonymously under the session id.
    app.app.cart().add_to_cart(&clementines, 1).await.unwrap();
    assert_eq!(app.app.cart().item_count(), 1);

    // Logging in adopts the anonymous cart.
    app.app
        .auth()
        .login("jo@example.com", "orange-grove-8", None)
        .await
        .unwrap();
    app.app.cart().refresh_cart().await.unwrap();
    assert_eq!(app.app.cart().item_count(), 1);

    // Checkout snapshots the cart into a fresh order.
    let order = app.app.orders().create_order(&new_order()).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.total_amount, dec(10, 0));
    assert_eq!(order.items.len(), 1);
    // Missing billing address means "same as shipping".
    assert_eq!(order.billing_address, order.shipping_address);

    // The server cleared the cart as part of checkout.
    app.app.cart().refresh_cart().await.unwrap();
    assert!(app.app.cart().cart().unwrap().is_empty());
}

#[tokio::test]
async fn test_checkout_requires_login() {
    let backend = TestBackend::spawn().await;
    let clementines = backend
        .state
        .seed_product("Clementine Crate", "citrus", dec(10, 0), 50);
    let app = TestApp::connect(&backend);

    app.app.cart().add_to_cart(&clementines, 1).await.unwrap();

    let err = app.app.orders().create_order(&new_order()).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
    assert_eq!(backend.state.order_count(), 0);
}

#[tokio::test]
async fn test_checkout_with_empty_cart_rejected() {
    let backend = TestBackend::spawn().await;
    let app = TestApp::connect(&backend);
    register_customer(&app, "jo@example.com").await;

    let err = app.app.orders().create_order(&new_order()).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(err.server_message(), Some("Cart is empty"));
}

// ============================================================================
// Order history
// ============================================================================

#[tokio::test]
async fn test_history_is_newest_first_and_scoped_to_user() {
    let backend = TestBackend::spawn().await;
    let clementines = backend
        .state
        .seed_product("Clementine Crate", "citrus", dec(10, 0), 50);

    let jo = TestApp::connect(&backend);
    register_customer(&jo, "jo@example.com").await;
    jo.app.cart().add_to_cart(&clementines, 1).await.unwrap();
    let first = jo.app.orders().create_order(&new_order()).await.unwrap();
    jo.app.cart().add_to_cart(&clementines, 2).await.unwrap();
    let second = jo.app.orders().create_order(&new_order()).await.unwrap();

    let page = jo
        .app
        .orders()
        .list_orders(clementine_client::orders::OrderQuery::default())
        .await
        .unwrap();
    assert_eq!(page.orders.len(), 2);
    assert_eq!(page.orders.first().unwrap().id, second.id);
    assert_eq!(page.orders.get(1).unwrap().id, first.id);

    // Another user cannot see Jo's order, even by id.
    let amy = TestApp::connect(&backend);
    register_customer(&amy, "amy@example.com").await;
    let err = amy.app.orders().get_order(&first.id).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

// ============================================================================
// Cancellation gating
// ============================================================================

#[tokio::test]
async fn test_pending_order_cancels_once() {
    let backend = TestBackend::spawn().await;
    let clementines = backend
        .state
        .seed_product("Clementine Crate", "citrus", dec(10, 0), 50);
    let app = TestApp::connect(&backend);
    register_customer(&app, "jo@example.com").await;

    app.app.cart().add_to_cart(&clementines, 1).await.unwrap();
    let order = app.app.orders().create_order(&new_order()).await.unwrap();
    assert!(order.status.is_cancellable());

    let cancelled = app.app.orders().cancel_order(&order).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    // A second cancel is blocked locally, before any request.
    let err = app.app.orders().cancel_order(&cancelled).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn test_shipped_order_cannot_be_cancelled() {
    let backend = TestBackend::spawn().await;
    let clementines = backend
        .state
        .seed_product("Clementine Crate", "citrus", dec(10, 0), 50);
    let app = TestApp::connect(&backend);
    register_customer(&app, "jo@example.com").await;

    app.app.cart().add_to_cart(&clementines, 1).await.unwrap();
    let order = app.app.orders().create_order(&new_order()).await.unwrap();

    // The warehouse ships it while the client still shows "pending".
    backend.state.set_order_status(&order.id, OrderStatus::Shipped);

    // A client with stale state passes the local gate; the server
    // still refuses.
    let err = app.app.orders().cancel_order(&order).await.unwrap_err();
    assert_eq!(err.server_message(), Some("Order can no longer be cancelled"));

    let current = app.app.orders().get_order(&order.id).await.unwrap();
    assert_eq!(current.status, OrderStatus::Shipped);
    // And a refreshed client never offers the action at all.
    assert!(!current.status.is_cancellable());
}
