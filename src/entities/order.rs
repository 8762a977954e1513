use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter as StrumEnumIter, EnumString};
use uuid::Uuid;

/// A placed order. Line items live in `order_items`; the shipping address is
/// snapshotted into the row at placement and never re-reads the address book.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub email: String,
    pub status: String,
    pub payment_status: String,
    pub payment_method: String,
    pub shipping_recipient: String,
    pub shipping_street: String,
    #[sea_orm(nullable)]
    pub shipping_apartment: Option<String>,
    pub shipping_city: String,
    pub shipping_state: String,
    pub shipping_zip: String,
    pub shipping_phone: String,
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItem,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fulfillment status of an order. Any status may follow any other; the
/// graph is deliberately unrestricted and only membership is enforced.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Display, EnumString, StrumEnumIter, Serialize, Deserialize,
)]
pub enum OrderStatus {
    #[strum(serialize = "Order Placed")]
    #[serde(rename = "Order Placed")]
    OrderPlaced,
    #[strum(serialize = "Shipped")]
    Shipped,
    #[strum(serialize = "Reached Nearby")]
    #[serde(rename = "Reached Nearby")]
    ReachedNearby,
    #[strum(serialize = "Delivered")]
    Delivered,
    #[strum(serialize = "Returned")]
    Returned,
}

impl OrderStatus {
    pub fn parse(value: &str) -> Option<Self> {
        Self::from_str(value).ok()
    }
}

/// Payment status, tracked independently of fulfillment.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Display, EnumString, StrumEnumIter, Serialize, Deserialize,
)]
pub enum PaymentStatus {
    #[strum(serialize = "Pending")]
    Pending,
    #[strum(serialize = "Paid")]
    Paid,
    #[strum(serialize = "Failed")]
    Failed,
}

impl PaymentStatus {
    pub fn parse(value: &str) -> Option<Self> {
        Self::from_str(value).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;
    use test_case::test_case;

    #[test]
    fn order_status_round_trips_through_wire_strings() {
        for status in OrderStatus::iter() {
            let wire = status.to_string();
            assert_eq!(OrderStatus::parse(&wire), Some(status));
        }
    }

    #[test_case("order placed"; "statuses are case sensitive")]
    #[test_case("Cancelled"; "status outside the set")]
    #[test_case(""; "empty status")]
    fn unknown_order_statuses_are_rejected(raw: &str) {
        assert_eq!(OrderStatus::parse(raw), None);
    }

    #[test]
    fn payment_status_round_trips_through_wire_strings() {
        for status in PaymentStatus::iter() {
            let wire = status.to_string();
            assert_eq!(PaymentStatus::parse(&wire), Some(status));
        }
        assert_eq!(PaymentStatus::parse("Refunded"), None);
    }
}
