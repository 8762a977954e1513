use crate::{
    db::DbPool,
    entities::order::Entity as OrderEntity,
    entities::order_item::{self, Entity as OrderItemEntity, Model as OrderItemModel, ReturnStatus},
    errors::ServiceError,
    events::{Event, EventSender},
    services::orders::{item_to_response, OrderItemResponse},
};
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Days after order creation during which a return may be requested.
/// The window is evaluated against the UTC clock.
const RETURN_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RequestReturnInput {
    #[validate(length(min = 1, message = "Return reason cannot be empty"))]
    pub reason: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResolveReturnInput {
    #[validate(length(min = 1, message = "Return status is required"))]
    pub status: String,
}

/// Service driving the per-item return workflow nested inside orders.
///
/// Mutations re-read the parent order and the target item inside one
/// transaction so concurrent requests against different items of the same
/// order cannot lose updates.
#[derive(Clone)]
pub struct ReturnService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl ReturnService {
    /// Creates a new return service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Opens a return request for one item of an order.
    ///
    /// Guards, in order: the order and item must exist, the item must not
    /// already carry a request, and the order must still be inside the
    /// 30-day window. A request exactly on the boundary is accepted.
    #[instrument(skip(self, input), fields(order_id = %order_id, item_id = %item_id))]
    pub async fn request_return(
        &self,
        order_id: Uuid,
        item_id: Uuid,
        input: RequestReturnInput,
    ) -> Result<OrderItemResponse, ServiceError> {
        input
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let txn = db.begin().await?;

        let (order_created_at, item) = Self::find_order_item(&txn, order_id, item_id).await?;

        if item.return_requested {
            return Err(ServiceError::AlreadyRequested(format!(
                "item {} already has a return request",
                item_id
            )));
        }

        let now = Utc::now();
        let window_closes_at = order_created_at + Duration::days(RETURN_WINDOW_DAYS);
        if now > window_closes_at {
            return Err(ServiceError::WindowExpired(format!(
                "the {}-day return window closed at {}",
                RETURN_WINDOW_DAYS, window_closes_at
            )));
        }

        let mut active: order_item::ActiveModel = item.into();
        active.return_requested = Set(true);
        active.return_reason = Set(Some(input.reason));
        active.return_status = Set(Some(ReturnStatus::Pending.to_string()));
        active.return_requested_at = Set(Some(now));
        active.updated_at = Set(Some(now));

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(order_id = %order_id, item_id = %item_id, "Return requested");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::ReturnRequested { order_id, item_id })
                .await
            {
                warn!(error = %e, order_id = %order_id, "Failed to send return requested event");
            }
        }

        Ok(item_to_response(updated))
    }

    /// Moves an active return request to a new status.
    ///
    /// `Approved` additionally marks the item as returned for downstream
    /// accounting; the parent order's status is never changed here.
    #[instrument(skip(self, input), fields(order_id = %order_id, item_id = %item_id))]
    pub async fn resolve_return(
        &self,
        order_id: Uuid,
        item_id: Uuid,
        input: ResolveReturnInput,
    ) -> Result<OrderItemResponse, ServiceError> {
        input
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let new_status = ReturnStatus::parse(&input.status).ok_or_else(|| {
            ServiceError::InvalidStatus(format!("unknown return status '{}'", input.status))
        })?;

        let db = &*self.db_pool;
        let txn = db.begin().await?;

        let (_, item) = Self::find_order_item(&txn, order_id, item_id).await?;

        if !item.return_requested {
            return Err(ServiceError::NoActiveRequest(format!(
                "item {} has no return request to resolve",
                item_id
            )));
        }

        let now = Utc::now();
        let mut active: order_item::ActiveModel = item.into();
        active.return_status = Set(Some(new_status.to_string()));
        active.return_processed_at = Set(Some(now));
        if new_status == ReturnStatus::Approved {
            active.returned = Set(true);
        }
        active.updated_at = Set(Some(now));

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(order_id = %order_id, item_id = %item_id, status = %new_status, "Return resolved");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::ReturnResolved {
                    order_id,
                    item_id,
                    status: new_status.to_string(),
                })
                .await
            {
                warn!(error = %e, order_id = %order_id, "Failed to send return resolved event");
            }
        }

        Ok(item_to_response(updated))
    }

    /// Loads the parent order's creation time and the addressed item,
    /// failing with NotFound when either is missing.
    async fn find_order_item(
        txn: &DatabaseTransaction,
        order_id: Uuid,
        item_id: Uuid,
    ) -> Result<(chrono::DateTime<Utc>, OrderItemModel), ServiceError> {
        let order = OrderEntity::find_by_id(order_id)
            .one(txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let item = OrderItemEntity::find_by_id(item_id)
            .filter(order_item::Column::OrderId.eq(order_id))
            .one(txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Item {} not found in order {}",
                    item_id, order_id
                ))
            })?;

        Ok((order.created_at, item))
    }
}
