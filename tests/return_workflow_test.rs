//! Integration tests for the per-item return workflow.
//!
//! Tests cover:
//! - Opening a return request and its idempotency guard
//! - The 30-day eligibility window boundary
//! - Resolution transitions, including the approved/returned coupling
//! - Existence guards for orders and items

mod common;

use assert_matches::assert_matches;
use chrono::Duration;
use common::{test_item, TestApp};
use rust_decimal_macros::dec;
use storefront_api::{
    errors::ServiceError,
    services::returns::{RequestReturnInput, ResolveReturnInput},
};
use uuid::Uuid;

fn reason(text: &str) -> RequestReturnInput {
    RequestReturnInput {
        reason: text.to_string(),
    }
}

fn resolve_to(status: &str) -> ResolveReturnInput {
    ResolveReturnInput {
        status: status.to_string(),
    }
}

// ==================== Requesting ====================

#[tokio::test]
async fn requesting_a_return_records_the_reason_and_pending_status() {
    let app = TestApp::new().await;
    let placed = app.place_test_order("return@test.com").await;
    let item_id = placed.items[0].id;

    let updated = app
        .returns
        .request_return(placed.order.id, item_id, reason("Item damaged in transit"))
        .await
        .expect("request return");

    assert!(updated.return_requested);
    assert_eq!(
        updated.return_reason.as_deref(),
        Some("Item damaged in transit")
    );
    assert_eq!(updated.return_status.as_deref(), Some("Pending"));
    assert!(updated.return_requested_at.is_some());
    assert!(updated.return_processed_at.is_none());
    assert!(!updated.returned);
}

#[tokio::test]
async fn second_request_on_the_same_item_is_rejected() {
    let app = TestApp::new().await;
    let placed = app.place_test_order("return@test.com").await;
    let item_id = placed.items[0].id;

    app.returns
        .request_return(placed.order.id, item_id, reason("Wrong color"))
        .await
        .expect("first request");

    let err = app
        .returns
        .request_return(placed.order.id, item_id, reason("Changed my mind"))
        .await
        .expect_err("second request");
    assert_matches!(err, ServiceError::AlreadyRequested(_));

    // The original reason is untouched
    let fetched = app.orders.get_order(placed.order.id).await.expect("get");
    assert_eq!(
        fetched.items[0].return_reason.as_deref(),
        Some("Wrong color")
    );
}

#[tokio::test]
async fn items_are_returnable_independently() {
    let app = TestApp::new().await;
    let placed = app
        .place_test_order_with_items(
            "return@test.com",
            vec![
                test_item("Desk", dec!(149.99), 1),
                test_item("Lamp", dec!(29.99), 1),
            ],
        )
        .await;

    app.returns
        .request_return(placed.order.id, placed.items[0].id, reason("Scratched"))
        .await
        .expect("first item request");

    // The sibling item still has no request and can open its own
    let second = app
        .returns
        .request_return(placed.order.id, placed.items[1].id, reason("Flickers"))
        .await
        .expect("second item request");
    assert!(second.return_requested);
}

#[tokio::test]
async fn empty_reason_is_rejected() {
    let app = TestApp::new().await;
    let placed = app.place_test_order("return@test.com").await;

    let err = app
        .returns
        .request_return(placed.order.id, placed.items[0].id, reason(""))
        .await
        .expect_err("empty reason");
    assert_matches!(err, ServiceError::ValidationError(_));
}

// ==================== Window ====================

#[tokio::test]
async fn requests_inside_the_window_succeed() {
    let app = TestApp::new().await;
    let placed = app.place_test_order("return@test.com").await;
    app.backdate_order(placed.order.id, Duration::days(29)).await;

    let updated = app
        .returns
        .request_return(placed.order.id, placed.items[0].id, reason("Too small"))
        .await
        .expect("29-day-old order is returnable");
    assert!(updated.return_requested);
}

#[tokio::test]
async fn requests_after_the_window_fail_with_window_expired() {
    let app = TestApp::new().await;
    let placed = app.place_test_order("return@test.com").await;
    app.backdate_order(placed.order.id, Duration::days(30) + Duration::seconds(1))
        .await;

    let err = app
        .returns
        .request_return(placed.order.id, placed.items[0].id, reason("Too late"))
        .await
        .expect_err("expired window");
    assert_matches!(err, ServiceError::WindowExpired(_));

    // The guard left the item untouched
    let fetched = app.orders.get_order(placed.order.id).await.expect("get");
    assert!(!fetched.items[0].return_requested);
}

// ==================== Resolution ====================

#[tokio::test]
async fn resolving_without_an_active_request_is_rejected() {
    let app = TestApp::new().await;
    let placed = app.place_test_order("return@test.com").await;

    let err = app
        .returns
        .resolve_return(placed.order.id, placed.items[0].id, resolve_to("Approved"))
        .await
        .expect_err("no active request");
    assert_matches!(err, ServiceError::NoActiveRequest(_));
}

#[tokio::test]
async fn approval_marks_the_item_returned_but_not_the_order() {
    let app = TestApp::new().await;
    let placed = app.place_test_order("return@test.com").await;
    let item_id = placed.items[0].id;

    app.returns
        .request_return(placed.order.id, item_id, reason("Defective"))
        .await
        .expect("request");

    let resolved = app
        .returns
        .resolve_return(placed.order.id, item_id, resolve_to("Approved"))
        .await
        .expect("approve");

    assert_eq!(resolved.return_status.as_deref(), Some("Approved"));
    assert!(resolved.returned);
    assert!(resolved.return_processed_at.is_some());

    // Order-level status never moves implicitly, even with every item returned
    let fetched = app.orders.get_order(placed.order.id).await.expect("get");
    assert_eq!(fetched.order.status, "Order Placed");
}

#[tokio::test]
async fn rejection_and_processing_do_not_mark_the_item_returned() {
    let app = TestApp::new().await;
    let placed = app
        .place_test_order_with_items(
            "return@test.com",
            vec![
                test_item("Desk", dec!(149.99), 1),
                test_item("Lamp", dec!(29.99), 1),
            ],
        )
        .await;

    for (item, status) in placed.items.iter().zip(["Rejected", "Processing"]) {
        app.returns
            .request_return(placed.order.id, item.id, reason("Not as described"))
            .await
            .expect("request");

        let resolved = app
            .returns
            .resolve_return(placed.order.id, item.id, resolve_to(status))
            .await
            .expect("resolve");
        assert_eq!(resolved.return_status.as_deref(), Some(status));
        assert!(!resolved.returned);
    }
}

#[tokio::test]
async fn return_statuses_may_overwrite_each_other() {
    let app = TestApp::new().await;
    let placed = app.place_test_order("return@test.com").await;
    let item_id = placed.items[0].id;

    app.returns
        .request_return(placed.order.id, item_id, reason("Defective"))
        .await
        .expect("request");

    // The resolution graph is as permissive as the order status graph:
    // a rejected request can later be approved.
    app.returns
        .resolve_return(placed.order.id, item_id, resolve_to("Rejected"))
        .await
        .expect("reject");
    let resolved = app
        .returns
        .resolve_return(placed.order.id, item_id, resolve_to("Approved"))
        .await
        .expect("approve after reject");
    assert_eq!(resolved.return_status.as_deref(), Some("Approved"));
    assert!(resolved.returned);
}

#[tokio::test]
async fn unknown_return_status_is_rejected() {
    let app = TestApp::new().await;
    let placed = app.place_test_order("return@test.com").await;
    let item_id = placed.items[0].id;

    app.returns
        .request_return(placed.order.id, item_id, reason("Defective"))
        .await
        .expect("request");

    let err = app
        .returns
        .resolve_return(placed.order.id, item_id, resolve_to("Completed"))
        .await
        .expect_err("unknown status");
    assert_matches!(err, ServiceError::InvalidStatus(_));
}

// ==================== Guards ====================

#[tokio::test]
async fn missing_order_or_item_fails_with_not_found() {
    let app = TestApp::new().await;
    let placed = app.place_test_order("return@test.com").await;

    let err = app
        .returns
        .request_return(Uuid::new_v4(), placed.items[0].id, reason("x"))
        .await
        .expect_err("unknown order");
    assert_matches!(err, ServiceError::NotFound(_));

    let err = app
        .returns
        .request_return(placed.order.id, Uuid::new_v4(), reason("x"))
        .await
        .expect_err("unknown item");
    assert_matches!(err, ServiceError::NotFound(_));

    let err = app
        .returns
        .resolve_return(placed.order.id, Uuid::new_v4(), resolve_to("Approved"))
        .await
        .expect_err("unknown item on resolve");
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn item_from_a_different_order_is_not_found() {
    let app = TestApp::new().await;
    let first = app.place_test_order("a@test.com").await;
    let second = app.place_test_order("b@test.com").await;

    // The item exists, but not inside the addressed order
    let err = app
        .returns
        .request_return(first.order.id, second.items[0].id, reason("x"))
        .await
        .expect_err("cross-order item");
    assert_matches!(err, ServiceError::NotFound(_));
}
