pub mod addresses;
pub mod orders;
pub mod payments;
pub mod returns;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub addresses: Arc<crate::services::AddressService>,
    pub orders: Arc<crate::services::OrderService>,
    pub returns: Arc<crate::services::ReturnService>,
    pub payments: Arc<crate::services::PaymentService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, config: &AppConfig) -> Self {
        let addresses = Arc::new(crate::services::AddressService::new(db_pool.clone()));
        let orders = Arc::new(crate::services::OrderService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
        ));
        let returns = Arc::new(crate::services::ReturnService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
        ));
        let payments = Arc::new(crate::services::PaymentService::new(
            db_pool,
            Some(event_sender),
            config.payment_secret.clone(),
        ));

        Self {
            addresses,
            orders,
            returns,
            payments,
        }
    }
}
