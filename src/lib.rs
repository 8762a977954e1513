//! Storefront API Library
//!
//! This crate provides the core functionality for the storefront API:
//! the order ledger, the per-item return workflow, and the per-user
//! address registry, plus the payment-confirmation and notification
//! collaborators they depend on.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::{extract::State, response::Json, routing::get, Router};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn address_service(&self) -> Arc<services::AddressService> {
        self.services.addresses.clone()
    }

    pub fn order_service(&self) -> Arc<services::OrderService> {
        self.services.orders.clone()
    }

    pub fn return_service(&self) -> Arc<services::ReturnService> {
        self.services.returns.clone()
    }

    pub fn payment_service(&self) -> Arc<services::PaymentService> {
        self.services.payments.clone()
    }
}

// Common response wrapper
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

// API v1 route table
pub fn api_v1_routes() -> Router<AppState> {
    let addresses = Router::new()
        .route(
            "/users/{user_id}/addresses",
            get(handlers::addresses::list_addresses)
                .post(handlers::addresses::create_address),
        )
        .route(
            "/users/{user_id}/addresses/{id}",
            axum::routing::put(handlers::addresses::update_address)
                .delete(handlers::addresses::delete_address),
        )
        .route(
            "/users/{user_id}/addresses/{id}/default",
            axum::routing::post(handlers::addresses::set_default_address),
        );

    let orders = Router::new()
        .route(
            "/orders",
            get(handlers::orders::list_orders).post(handlers::orders::create_order),
        )
        .route("/orders/{id}", get(handlers::orders::get_order))
        .route(
            "/orders/{id}/status",
            axum::routing::put(handlers::orders::update_order_status),
        );

    let returns = Router::new().route(
        "/orders/{id}/items/{item_id}/return",
        axum::routing::post(handlers::returns::request_return)
            .put(handlers::returns::resolve_return),
    );

    let payments = Router::new().route(
        "/payments/confirm",
        axum::routing::post(handlers::payments::confirm_payment),
    );

    Router::new()
        // Status and health endpoints
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .merge(addresses)
        .merge(orders)
        .merge(returns)
        .merge(payments)
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let version = env!("CARGO_PKG_VERSION");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "service": "storefront-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    // Check database connectivity
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}
