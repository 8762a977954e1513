use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter as StrumEnumIter, EnumString};
use uuid::Uuid;

/// One product line within an order. Everything except the embedded return
/// request is immutable after placement.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    #[sea_orm(nullable)]
    pub image_url: Option<String>,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub return_requested: bool,
    #[sea_orm(nullable)]
    pub return_reason: Option<String>,
    #[sea_orm(nullable)]
    pub return_status: Option<String>,
    #[sea_orm(nullable)]
    pub return_requested_at: Option<DateTime<Utc>>,
    #[sea_orm(nullable)]
    pub return_processed_at: Option<DateTime<Utc>>,
    pub returned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        let now = Utc::now();

        if insert {
            if let ActiveValue::NotSet = active_model.created_at {
                active_model.created_at = Set(now);
            }
        }

        if let ActiveValue::NotSet = active_model.updated_at {
            active_model.updated_at = Set(Some(now));
        }

        Ok(active_model)
    }
}

/// Status of an item's return request. Only assigned once the request flag
/// has flipped; overwrites between the four values are unrestricted.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Display, EnumString, StrumEnumIter, Serialize, Deserialize,
)]
pub enum ReturnStatus {
    #[strum(serialize = "Pending")]
    Pending,
    #[strum(serialize = "Approved")]
    Approved,
    #[strum(serialize = "Rejected")]
    Rejected,
    #[strum(serialize = "Processing")]
    Processing,
}

impl ReturnStatus {
    pub fn parse(value: &str) -> Option<Self> {
        Self::from_str(value).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn return_status_round_trips_through_wire_strings() {
        for status in ReturnStatus::iter() {
            assert_eq!(ReturnStatus::parse(&status.to_string()), Some(status));
        }
        assert_eq!(ReturnStatus::parse("Completed"), None);
        assert_eq!(ReturnStatus::parse("pending"), None);
    }
}
