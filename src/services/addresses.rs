use crate::{
    db::DbPool,
    entities::address::{self, Entity as AddressEntity, Model as AddressModel},
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Maximum number of live addresses per owner.
const ADDRESS_LIMIT: u64 = 2;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAddressInput {
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
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAddressInput {
    pub recipient: Option<String>,
    pub street: Option<String>,
    pub apartment: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
    pub is_default: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddressResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub recipient: String,
    pub street: String,
    pub apartment: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<AddressModel> for AddressResponse {
    fn from(model: AddressModel) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            recipient: model.recipient,
            street: model.street,
            apartment: model.apartment,
            city: model.city,
            state: model.state,
            zip: model.zip,
            phone: model.phone,
            is_default: model.is_default,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Service maintaining each owner's address book.
///
/// Every mutation that could leave zero or multiple defaults runs a
/// demote-then-set sequence inside one transaction; the read path repairs
/// any gap left by a crash between the two phases.
#[derive(Clone)]
pub struct AddressService {
    db_pool: Arc<DbPool>,
}

impl AddressService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Lists an owner's addresses, default first, then oldest first.
    ///
    /// If no address is currently marked default and the set is non-empty,
    /// the earliest-created address is promoted before returning.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn list_addresses(&self, owner: Uuid) -> Result<Vec<AddressResponse>, ServiceError> {
        let db = &*self.db_pool;

        let mut addresses = AddressEntity::find()
            .filter(address::Column::UserId.eq(owner))
            .order_by_asc(address::Column::CreatedAt)
            .order_by_asc(address::Column::Id)
            .all(db)
            .await?;

        if !addresses.is_empty() && !addresses.iter().any(|a| a.is_default) {
            let earliest = addresses[0].clone();
            warn!(owner = %owner, address_id = %earliest.id, "No default address found; promoting earliest");

            let mut active: address::ActiveModel = earliest.into();
            active.is_default = Set(true);
            active.updated_at = Set(Some(Utc::now()));
            let repaired = active.update(db).await?;
            addresses[0] = repaired;
        }

        // Default first, then creation order
        addresses.sort_by(|a, b| {
            b.is_default
                .cmp(&a.is_default)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });

        Ok(addresses.into_iter().map(AddressResponse::from).collect())
    }

    /// Creates an address for the owner, enforcing the two-address cap.
    /// The owner's first address becomes default regardless of the flag.
    #[instrument(skip(self, input), fields(owner = %owner))]
    pub async fn create_address(
        &self,
        owner: Uuid,
        input: CreateAddressInput,
    ) -> Result<AddressResponse, ServiceError> {
        input.validate()?;

        let db = &*self.db_pool;
        let txn = db.begin().await?;

        let existing = AddressEntity::find()
            .filter(address::Column::UserId.eq(owner))
            .count(&txn)
            .await?;

        if existing >= ADDRESS_LIMIT {
            return Err(ServiceError::LimitExceeded(format!(
                "owner already has {} addresses",
                ADDRESS_LIMIT
            )));
        }

        let make_default = input.is_default || existing == 0;
        if make_default && existing > 0 {
            Self::demote_all(&txn, owner).await?;
        }

        let now = Utc::now();
        let model = address::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(owner),
            recipient: Set(input.recipient),
            street: Set(input.street),
            apartment: Set(input.apartment),
            city: Set(input.city),
            state: Set(input.state),
            zip: Set(input.zip),
            phone: Set(input.phone),
            is_default: Set(make_default),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let inserted = model.insert(&txn).await?;
        txn.commit().await?;

        info!(owner = %owner, address_id = %inserted.id, is_default = inserted.is_default, "Address created");
        Ok(inserted.into())
    }

    /// Updates an owned address in place, re-running the demote phase when
    /// the update claims the default flag.
    #[instrument(skip(self, input), fields(owner = %owner, address_id = %id))]
    pub async fn update_address(
        &self,
        owner: Uuid,
        id: Uuid,
        input: UpdateAddressInput,
    ) -> Result<AddressResponse, ServiceError> {
        input.validate()?;

        let db = &*self.db_pool;
        let txn = db.begin().await?;

        let existing = Self::find_owned(&txn, owner, id).await?;

        if input.is_default == Some(true) {
            Self::demote_all(&txn, owner).await?;
        }

        let mut active: address::ActiveModel = existing.into();
        if let Some(recipient) = input.recipient {
            active.recipient = Set(recipient);
        }
        if let Some(street) = input.street {
            active.street = Set(street);
        }
        if let Some(apartment) = input.apartment {
            active.apartment = Set(Some(apartment));
        }
        if let Some(city) = input.city {
            active.city = Set(city);
        }
        if let Some(state) = input.state {
            active.state = Set(state);
        }
        if let Some(zip) = input.zip {
            active.zip = Set(zip);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(phone);
        }
        if let Some(is_default) = input.is_default {
            active.is_default = Set(is_default);
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(owner = %owner, address_id = %id, "Address updated");
        Ok(updated.into())
    }

    /// Atomically demotes all siblings and promotes the target.
    #[instrument(skip(self), fields(owner = %owner, address_id = %id))]
    pub async fn set_default(&self, owner: Uuid, id: Uuid) -> Result<AddressResponse, ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await?;

        let target = Self::find_owned(&txn, owner, id).await?;

        Self::demote_all(&txn, owner).await?;

        let mut active: address::ActiveModel = target.into();
        active.is_default = Set(true);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        info!(owner = %owner, address_id = %id, "Default address set");
        Ok(updated.into())
    }

    /// Deletes an owned address. When the default is removed and another
    /// address remains, the oldest remaining one is promoted in the same
    /// transaction.
    #[instrument(skip(self), fields(owner = %owner, address_id = %id))]
    pub async fn delete_address(&self, owner: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await?;

        let existing = Self::find_owned(&txn, owner, id).await?;
        let was_default = existing.is_default;

        AddressEntity::delete_by_id(id).exec(&txn).await?;

        if was_default {
            let fallback = AddressEntity::find()
                .filter(address::Column::UserId.eq(owner))
                .order_by_asc(address::Column::CreatedAt)
                .order_by_asc(address::Column::Id)
                .one(&txn)
                .await?;

            if let Some(oldest) = fallback {
                let fallback_id = oldest.id;
                let mut active: address::ActiveModel = oldest.into();
                active.is_default = Set(true);
                active.updated_at = Set(Some(Utc::now()));
                active.update(&txn).await?;
                info!(owner = %owner, address_id = %fallback_id, "Promoted fallback default after delete");
            }
        }

        txn.commit().await?;

        info!(owner = %owner, address_id = %id, "Address deleted");
        Ok(())
    }

    /// Loads an address and enforces existence and ownership.
    async fn find_owned(
        txn: &DatabaseTransaction,
        owner: Uuid,
        id: Uuid,
    ) -> Result<AddressModel, ServiceError> {
        let address = AddressEntity::find_by_id(id)
            .one(txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Address {} not found", id)))?;

        if address.user_id != owner {
            return Err(ServiceError::Forbidden(
                "address belongs to a different user".to_string(),
            ));
        }

        Ok(address)
    }

    /// Phase one of demote-then-set: clear the flag across the owner's set.
    async fn demote_all(txn: &DatabaseTransaction, owner: Uuid) -> Result<(), ServiceError> {
        AddressEntity::update_many()
            .col_expr(address::Column::IsDefault, Expr::value(false))
            .filter(address::Column::UserId.eq(owner))
            .filter(address::Column::IsDefault.eq(true))
            .exec(txn)
            .await?;
        Ok(())
    }
}
