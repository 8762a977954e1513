use crate::{
    errors::ServiceError,
    services::addresses::{AddressResponse, CreateAddressInput, UpdateAddressInput},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// GET /users/{user_id}/addresses
pub async fn list_addresses(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Vec<AddressResponse>> {
    let addresses = state.address_service().list_addresses(user_id).await?;
    Ok(Json(ApiResponse::success(addresses)))
}

/// POST /users/{user_id}/addresses
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/addresses",
    request_body = CreateAddressInput,
    responses(
        (status = 200, description = "Address created"),
        (status = 400, description = "Validation failure or address limit reached", body = crate::errors::ErrorResponse)
    ),
    tag = "Addresses"
)]
pub async fn create_address(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<CreateAddressInput>,
) -> ApiResult<AddressResponse> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let created = state
        .address_service()
        .create_address(user_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(created)))
}

/// PUT /users/{user_id}/addresses/{id}
pub async fn update_address(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateAddressInput>,
) -> ApiResult<AddressResponse> {
    let updated = state
        .address_service()
        .update_address(user_id, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// POST /users/{user_id}/addresses/{id}/default
pub async fn set_default_address(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<AddressResponse> {
    let updated = state.address_service().set_default(user_id, id).await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// DELETE /users/{user_id}/addresses/{id}
pub async fn delete_address(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<serde_json::Value> {
    state.address_service().delete_address(user_id, id).await?;
    Ok(Json(ApiResponse::success(json!({
        "address_id": id,
        "deleted": true
    }))))
}
