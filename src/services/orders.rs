use crate::{
    db::DbPool,
    entities::order::{self, Entity as OrderEntity, Model as OrderModel, OrderStatus, PaymentStatus},
    entities::order_item::{self, Entity as OrderItemEntity, Model as OrderItemModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Request/Response types for the order service
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PlaceOrderRequest {
    #[validate(email(message = "A valid contact email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "An order needs at least one item"))]
    pub items: Vec<OrderItemInput>,
    #[validate]
    pub shipping_address: ShippingAddressInput,
    #[validate(length(min = 1, message = "Payment method is required"))]
    pub payment_method: String,
    #[serde(default)]
    pub subtotal: Decimal,
    #[serde(default)]
    pub shipping_fee: Decimal,
    #[serde(default)]
    pub tax: Decimal,
    /// Kept optional so an absent total is reported as a domain error
    /// instead of a deserialization failure.
    pub total: Option<Decimal>,
    pub payment_status: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct OrderItemInput {
    pub product_id: Uuid,
    #[validate(length(min = 1, message = "Item name is required"))]
    pub name: String,
    pub image_url: Option<String>,
    pub unit_price: Decimal,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ShippingAddressInput {
    #[validate(length(min = 1, message = "Recipient name is required"))]
    pub recipient: String,
    #[validate(length(min = 1, message = "Street is required"))]
    pub street: String,
    pub apartment: Option<String>,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,
    #[validate(length(min = 1, message = "Zip code is required"))]
    pub zip: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderStatusRequest {
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShippingAddressResponse {
    pub recipient: String,
    pub street: String,
    pub apartment: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub email: String,
    pub status: String,
    pub payment_status: String,
    pub payment_method: String,
    pub shipping_address: ShippingAddressResponse,
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub return_requested: bool,
    pub return_reason: Option<String>,
    pub return_status: Option<String>,
    pub return_requested_at: Option<DateTime<Utc>>,
    pub return_processed_at: Option<DateTime<Utc>>,
    pub returned: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetailResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service recording placed orders and tracking their fulfillment status.
/// Orders are append-only: nothing here deletes a row.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderService {
    /// Creates a new order service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Places a new order from a checkout payload.
    ///
    /// The order and its line items are inserted in one transaction; the
    /// confirmation notification is emitted after commit and can never fail
    /// the placement.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn place_order(
        &self,
        request: PlaceOrderRequest,
    ) -> Result<OrderDetailResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        for item in &request.items {
            item.validate()
                .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        }

        let total = request
            .total
            .ok_or_else(|| ServiceError::InvalidInput("Order total is required".to_string()))?;
        if total <= Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Order total must be positive".to_string(),
            ));
        }

        let payment_status = match request.payment_status.as_deref() {
            None => PaymentStatus::Pending,
            Some(raw) => PaymentStatus::parse(raw).ok_or_else(|| {
                ServiceError::InvalidStatus(format!("unknown payment status '{}'", raw))
            })?,
        };

        let db = &*self.db_pool;
        let now = Utc::now();
        let order_id = Uuid::new_v4();

        let txn = db.begin().await?;

        let order_active_model = order::ActiveModel {
            id: Set(order_id),
            email: Set(request.email.clone()),
            status: Set(OrderStatus::OrderPlaced.to_string()),
            payment_status: Set(payment_status.to_string()),
            payment_method: Set(request.payment_method),
            shipping_recipient: Set(request.shipping_address.recipient),
            shipping_street: Set(request.shipping_address.street),
            shipping_apartment: Set(request.shipping_address.apartment),
            shipping_city: Set(request.shipping_address.city),
            shipping_state: Set(request.shipping_address.state),
            shipping_zip: Set(request.shipping_address.zip),
            shipping_phone: Set(request.shipping_address.phone),
            subtotal: Set(request.subtotal),
            shipping_fee: Set(request.shipping_fee),
            tax: Set(request.tax),
            total: Set(total),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let order_model = order_active_model.insert(&txn).await?;

        let mut item_models = Vec::with_capacity(request.items.len());
        for item in request.items {
            let item_active_model = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(item.product_id),
                name: Set(item.name),
                image_url: Set(item.image_url),
                unit_price: Set(item.unit_price),
                quantity: Set(item.quantity),
                return_requested: Set(false),
                return_reason: Set(None),
                return_status: Set(None),
                return_requested_at: Set(None),
                return_processed_at: Set(None),
                returned: Set(false),
                created_at: Set(now),
                updated_at: Set(Some(now)),
            };
            item_models.push(item_active_model.insert(&txn).await?);
        }

        txn.commit().await?;

        info!(order_id = %order_id, email = %order_model.email, "Order placed");

        // Best-effort confirmation; failure is logged and absorbed
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::OrderPlaced {
                    order_id,
                    email: order_model.email.clone(),
                    total,
                })
                .await
            {
                warn!(error = %e, order_id = %order_id, "Failed to send order placed event");
            }
        }

        Ok(OrderDetailResponse {
            order: order_to_response(order_model),
            items: item_models.into_iter().map(item_to_response).collect(),
        })
    }

    /// Retrieves an order and its items by ID
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderDetailResponse, ServiceError> {
        let db = &*self.db_pool;

        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let items = order
            .find_related(OrderItemEntity)
            .order_by_asc(order_item::Column::CreatedAt)
            .order_by_asc(order_item::Column::Id)
            .all(db)
            .await?;

        Ok(OrderDetailResponse {
            order: order_to_response(order),
            items: items.into_iter().map(item_to_response).collect(),
        })
    }

    /// Lists orders newest first, optionally filtered by contact email.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        email: Option<String>,
        page: u64,
        per_page: u64,
    ) -> Result<OrderListResponse, ServiceError> {
        let db = &*self.db_pool;

        let mut query = OrderEntity::find();
        if let Some(email) = email {
            query = query.filter(order::Column::Email.eq(email));
        }

        let paginator = query
            .order_by_desc(order::Column::CreatedAt)
            .paginate(db, per_page);

        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page.saturating_sub(1)).await?;

        info!(total = total, page = page, per_page = per_page, "Orders listed");

        Ok(OrderListResponse {
            orders: orders.into_iter().map(order_to_response).collect(),
            total,
            page,
            per_page,
        })
    }

    /// Updates an order's fulfillment status.
    ///
    /// Membership in the status set is enforced; ordering between statuses
    /// is not, so any status can follow any other.
    #[instrument(skip(self, request), fields(order_id = %order_id, new_status = %request.status))]
    pub async fn update_order_status(
        &self,
        order_id: Uuid,
        request: UpdateOrderStatusRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let new_status = OrderStatus::parse(&request.status).ok_or_else(|| {
            ServiceError::InvalidStatus(format!("unknown order status '{}'", request.status))
        })?;

        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await?;

        let order = OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                warn!(order_id = %order_id, "Order not found for status update");
                ServiceError::NotFound(format!("Order {} not found", order_id))
            })?;

        let old_status = order.status.clone();

        let mut order_active_model: order::ActiveModel = order.into();
        order_active_model.status = Set(new_status.to_string());
        order_active_model.updated_at = Set(Some(now));

        let updated_order = order_active_model.update(&txn).await?;

        txn.commit().await?;

        info!(order_id = %order_id, old_status = %old_status, new_status = %new_status, "Order status updated");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::OrderStatusChanged {
                    order_id,
                    old_status,
                    new_status: new_status.to_string(),
                })
                .await
            {
                warn!(error = %e, order_id = %order_id, "Failed to send order status changed event");
            }
        }

        Ok(order_to_response(updated_order))
    }
}

/// Converts an order model to response format
pub(crate) fn order_to_response(model: OrderModel) -> OrderResponse {
    OrderResponse {
        id: model.id,
        email: model.email,
        status: model.status,
        payment_status: model.payment_status,
        payment_method: model.payment_method,
        shipping_address: ShippingAddressResponse {
            recipient: model.shipping_recipient,
            street: model.shipping_street,
            apartment: model.shipping_apartment,
            city: model.shipping_city,
            state: model.shipping_state,
            zip: model.shipping_zip,
            phone: model.shipping_phone,
        },
        subtotal: model.subtotal,
        shipping_fee: model.shipping_fee,
        tax: model.tax,
        total: model.total,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub(crate) fn item_to_response(model: OrderItemModel) -> OrderItemResponse {
    OrderItemResponse {
        id: model.id,
        product_id: model.product_id,
        name: model.name,
        image_url: model.image_url,
        unit_price: model.unit_price,
        quantity: model.quantity,
        return_requested: model.return_requested,
        return_reason: model.return_reason,
        return_status: model.return_status,
        return_requested_at: model.return_requested_at,
        return_processed_at: model.return_processed_at,
        returned: model.returned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn order_model_maps_to_response() {
        let now = Utc::now();
        let order_id = Uuid::new_v4();

        let model = OrderModel {
            id: order_id,
            email: "shopper@example.com".to_string(),
            status: OrderStatus::OrderPlaced.to_string(),
            payment_status: PaymentStatus::Pending.to_string(),
            payment_method: "card".to_string(),
            shipping_recipient: "Ada Lovelace".to_string(),
            shipping_street: "12 Analytical Way".to_string(),
            shipping_apartment: None,
            shipping_city: "London".to_string(),
            shipping_state: "LDN".to_string(),
            shipping_zip: "N1 9GU".to_string(),
            shipping_phone: "5550100".to_string(),
            subtotal: dec!(90.00),
            shipping_fee: dec!(5.00),
            tax: dec!(4.99),
            total: dec!(99.99),
            created_at: now,
            updated_at: Some(now),
        };

        let response = order_to_response(model);

        assert_eq!(response.id, order_id);
        assert_eq!(response.status, "Order Placed");
        assert_eq!(response.payment_status, "Pending");
        assert_eq!(response.shipping_address.recipient, "Ada Lovelace");
        assert_eq!(response.total, dec!(99.99));
    }
}
