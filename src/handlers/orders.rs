use crate::{
    errors::ServiceError,
    services::orders::{
        OrderDetailResponse, OrderListResponse, OrderResponse, PlaceOrderRequest,
        UpdateOrderStatusRequest,
    },
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct OrderListQuery {
    /// Page number (1-indexed)
    pub page: Option<u64>,
    /// Page size (max 100)
    pub limit: Option<u64>,
    /// Optional contact email filter
    pub email: Option<String>,
}

/// POST /orders
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 200, description = "Order placed"),
        (status = 400, description = "Missing email, empty items, or non-positive total", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<PlaceOrderRequest>,
) -> ApiResult<OrderDetailResponse> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let created = state.order_service().place_order(payload).await?;
    Ok(Json(ApiResponse::success(created)))
}

/// GET /orders
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<OrderListResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let orders = state
        .order_service()
        .list_orders(query.email, page, limit)
        .await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// GET /orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderDetailResponse> {
    let order = state.order_service().get_order(id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// PUT /orders/{id}/status
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/status",
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Status outside the allowed set", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> ApiResult<OrderResponse> {
    let updated = state.order_service().update_order_status(id, payload).await?;
    Ok(Json(ApiResponse::success(updated)))
}
