//! ServiceRequest pallet handler bundle.
//!
//! Customer requests for services no lab offers yet, stored in the
//! `create-service-request` index keyed by request hash.

mod documents;
mod handler;

use std::sync::Arc;

use conductor_core::ports::{CommandHandler, SERVICE_REQUESTS_INDEX};

use crate::HandlerBundle;
use crate::stores::Stores;
use crate::transactions::TransactionLogger;

pub use documents::{ClaimDocument, InvoiceDocument, RequestDocument};
pub use handler::{STAKING_CURRENCY, ServiceRequestsHandler};

pub struct ServiceRequestsBundle {
    stores: Stores,
}

impl ServiceRequestsBundle {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }
}

impl HandlerBundle for ServiceRequestsBundle {
    fn name(&self) -> &'static str {
        "service_requests"
    }

    fn handlers(&self) -> Vec<Arc<dyn CommandHandler>> {
        vec![Arc::new(ServiceRequestsHandler::new(
            self.stores.search.clone(),
            TransactionLogger::new(self.stores.transactions.clone()),
        ))]
    }

    fn indices(&self) -> &'static [&'static str] {
        &[SERVICE_REQUESTS_INDEX]
    }
}
