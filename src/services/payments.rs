use crate::{
    db::DbPool,
    entities::order::{self, Entity as OrderEntity, PaymentStatus},
    errors::ServiceError,
    events::{Event, EventSender},
};
use hmac::{Hmac, Mac};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use sha2::Sha256;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Outcome of a payment confirmation attempt.
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct PaymentConfirmation {
    pub order_id: Uuid,
    pub verified: bool,
    pub payment_status: String,
}

/// Validates payment-provider confirmation callbacks.
///
/// The provider signs `"{order_id}|{payment_id}"` with the shared secret;
/// a single constant-time comparison decides the outcome. No retries.
#[derive(Clone)]
pub struct PaymentService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    secret: String,
}

impl PaymentService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            secret: secret.into(),
        }
    }

    /// Computes the expected hex digest for an order/payment pair.
    pub fn compute_signature(&self, order_id: &str, payment_id: &str) -> String {
        let signed = format!("{}|{}", order_id, payment_id);
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signed.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Checks a supplied signature against the expected digest.
    pub fn verify(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        let expected = self.compute_signature(order_id, payment_id);
        constant_time_eq(&expected, signature)
    }

    /// Verifies a provider callback and, on success, marks the order paid.
    /// An invalid signature leaves the order untouched.
    #[instrument(skip(self, signature), fields(order_id = %order_id))]
    pub async fn confirm_payment(
        &self,
        order_id: Uuid,
        payment_id: &str,
        signature: &str,
    ) -> Result<PaymentConfirmation, ServiceError> {
        let db = &*self.db_pool;

        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        if !self.verify(&order_id.to_string(), payment_id, signature) {
            warn!(order_id = %order_id, "Payment confirmation signature rejected");
            return Ok(PaymentConfirmation {
                order_id,
                verified: false,
                payment_status: order.payment_status,
            });
        }

        let mut active: order::ActiveModel = order.into();
        active.payment_status = Set(PaymentStatus::Paid.to_string());
        active.updated_at = Set(Some(chrono::Utc::now()));
        let updated = active.update(db).await?;

        info!(order_id = %order_id, "Payment confirmed and order marked paid");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::PaymentVerified { order_id }).await {
                warn!(error = %e, order_id = %order_id, "Failed to send payment verified event");
            }
        }

        Ok(PaymentConfirmation {
            order_id,
            verified: true,
            payment_status: updated.payment_status,
        })
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut res = 0u8;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        res |= x ^ y;
    }
    res == 0
}
