use crate::{
    services::orders::OrderItemResponse,
    services::returns::{RequestReturnInput, ResolveReturnInput},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, State},
    response::Json,
};
use uuid::Uuid;

/// POST /orders/{id}/items/{item_id}/return
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/items/{item_id}/return",
    request_body = RequestReturnInput,
    responses(
        (status = 200, description = "Return request opened"),
        (status = 404, description = "Order or item not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Return already requested", body = crate::errors::ErrorResponse),
        (status = 422, description = "Return window expired", body = crate::errors::ErrorResponse)
    ),
    tag = "Returns"
)]
pub async fn request_return(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<RequestReturnInput>,
) -> ApiResult<OrderItemResponse> {
    let updated = state
        .return_service()
        .request_return(id, item_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// PUT /orders/{id}/items/{item_id}/return
pub async fn resolve_return(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ResolveReturnInput>,
) -> ApiResult<OrderItemResponse> {
    let updated = state
        .return_service()
        .resolve_return(id, item_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}
