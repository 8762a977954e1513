use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::services::notifications::NotificationService;

/// Events emitted by the core services after their primary write commits.
/// Delivery is best-effort; no consumer failure ever reaches the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderPlaced {
        order_id: Uuid,
        email: String,
        total: Decimal,
    },
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },
    ReturnRequested {
        order_id: Uuid,
        item_id: Uuid,
    },
    ReturnResolved {
        order_id: Uuid,
        item_id: Uuid,
        status: String,
    },
    PaymentVerified {
        order_id: Uuid,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Consumes events off the channel and fans them out to side effects.
/// Only order placement triggers an outbound notification; everything else
/// is logged for observability.
pub async fn process_events(mut rx: mpsc::Receiver<Event>, notifier: Arc<NotificationService>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match event {
            Event::OrderPlaced {
                order_id,
                email,
                total,
            } => {
                if let Err(e) = notifier.notify_order_confirmed(&email, order_id, total).await {
                    warn!(
                        order_id = %order_id,
                        error = %e,
                        "Order confirmation notification failed; continuing"
                    );
                }
            }
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => {
                info!(order_id = %order_id, from = %old_status, to = %new_status, "Order status changed");
            }
            Event::ReturnRequested { order_id, item_id } => {
                info!(order_id = %order_id, item_id = %item_id, "Return requested");
            }
            Event::ReturnResolved {
                order_id,
                item_id,
                status,
            } => {
                info!(order_id = %order_id, item_id = %item_id, status = %status, "Return resolved");
            }
            Event::PaymentVerified { order_id } => {
                info!(order_id = %order_id, "Payment verified");
            }
        }
    }

    info!("Event channel closed; stopping event processing loop");
}
