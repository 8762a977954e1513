#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use storefront_api::{
    db::{self, DbConfig, DbPool},
    entities::order,
    events::{Event, EventSender},
    services::{
        orders::{OrderDetailResponse, OrderItemInput, PlaceOrderRequest, ShippingAddressInput},
        AddressService, OrderService, PaymentService, ReturnService,
    },
};
use tokio::sync::mpsc;
use uuid::Uuid;

pub const TEST_PAYMENT_SECRET: &str = "test_payment_secret_0123456789abcdef";

/// Helper harness wiring the core services to a fresh in-memory SQLite
/// database with migrations applied.
pub struct TestApp {
    pub db: Arc<DbPool>,
    pub addresses: AddressService,
    pub orders: OrderService,
    pub returns: ReturnService,
    pub payments: PaymentService,
    // Kept alive so event sends do not fail mid-test
    _event_rx: mpsc::Receiver<Event>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let config = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };

        let pool = db::establish_connection_with_config(&config)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = Arc::new(EventSender::new(event_tx));

        Self {
            addresses: AddressService::new(db.clone()),
            orders: OrderService::new(db.clone(), Some(event_sender.clone())),
            returns: ReturnService::new(db.clone(), Some(event_sender.clone())),
            payments: PaymentService::new(db.clone(), Some(event_sender), TEST_PAYMENT_SECRET),
            db,
            _event_rx: event_rx,
        }
    }

    /// Place a single-item order for the given contact email.
    pub async fn place_test_order(&self, email: &str) -> OrderDetailResponse {
        self.place_test_order_with_items(email, vec![test_item("Walnut Desk", dec!(149.99), 1)])
            .await
    }

    pub async fn place_test_order_with_items(
        &self,
        email: &str,
        items: Vec<OrderItemInput>,
    ) -> OrderDetailResponse {
        let subtotal: Decimal = items
            .iter()
            .map(|i| i.unit_price * Decimal::from(i.quantity))
            .sum();
        let request = PlaceOrderRequest {
            email: email.to_string(),
            items,
            shipping_address: test_shipping_address(),
            payment_method: "card".to_string(),
            subtotal,
            shipping_fee: dec!(5.00),
            tax: Decimal::ZERO,
            total: Some(subtotal + dec!(5.00)),
            payment_status: None,
        };

        self.orders
            .place_order(request)
            .await
            .expect("test order should place")
    }

    /// Rewrites an order's creation timestamp, used to age orders past the
    /// return window without waiting.
    pub async fn backdate_order(&self, order_id: Uuid, age: Duration) {
        let model = order::Entity::find_by_id(order_id)
            .one(&*self.db)
            .await
            .expect("order lookup")
            .expect("order exists");

        let mut active: order::ActiveModel = model.into();
        active.created_at = Set(Utc::now() - age);
        active.update(&*self.db).await.expect("backdate order");
    }
}

pub fn test_item(name: &str, unit_price: Decimal, quantity: i32) -> OrderItemInput {
    OrderItemInput {
        product_id: Uuid::new_v4(),
        name: name.to_string(),
        image_url: None,
        unit_price,
        quantity,
    }
}

pub fn test_shipping_address() -> ShippingAddressInput {
    ShippingAddressInput {
        recipient: "Grace Hopper".to_string(),
        street: "1 Compiler Court".to_string(),
        apartment: None,
        city: "Arlington".to_string(),
        state: "VA".to_string(),
        zip: "22202".to_string(),
        phone: "5550100".to_string(),
    }
}
