use crate::errors::ServiceError;
use rust_decimal::Decimal;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Payload posted to the configured confirmation webhook.
#[derive(Debug, Clone, Serialize)]
pub struct OrderConfirmation {
    #[serde(rename = "type")]
    pub event_type: String, // "order_confirmed"
    pub order_id: Uuid,
    pub recipient: String,
    pub total: Decimal,
}

/// Delivery service for order-confirmation notifications.
///
/// Delivery is fire-and-forget: callers run inside the event loop, which
/// logs failures and moves on. An unset webhook URL disables delivery.
#[derive(Clone)]
pub struct NotificationService {
    client: reqwest::Client,
    webhook_url: Option<String>,
}

impl NotificationService {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            webhook_url,
        }
    }

    /// Send an order confirmation to the contact address.
    #[instrument(skip(self, total), fields(order_id = %order_id))]
    pub async fn notify_order_confirmed(
        &self,
        email: &str,
        order_id: Uuid,
        total: Decimal,
    ) -> Result<(), ServiceError> {
        let Some(url) = self.webhook_url.as_deref() else {
            debug!(order_id = %order_id, "Notification webhook not configured; skipping delivery");
            return Ok(());
        };

        let payload = OrderConfirmation {
            event_type: "order_confirmed".to_string(),
            order_id,
            recipient: email.to_string(),
            total,
        };

        let response = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ServiceError::ExternalServiceError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ServiceError::ExternalServiceError(format!(
                "notification endpoint returned {}",
                response.status()
            )));
        }

        info!(order_id = %order_id, "Order confirmation delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn unconfigured_webhook_is_a_no_op() {
        let service = NotificationService::new(None);
        let result = service
            .notify_order_confirmed("a@b.com", Uuid::new_v4(), dec!(49.99))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn unreachable_webhook_reports_external_error() {
        // Port 9 (discard) is a safe dead endpoint for tests.
        let service = NotificationService::new(Some("http://127.0.0.1:9/hooks".to_string()));
        let result = service
            .notify_order_confirmed("a@b.com", Uuid::new_v4(), dec!(10.00))
            .await;
        assert!(matches!(
            result,
            Err(ServiceError::ExternalServiceError(_))
        ));
    }
}
