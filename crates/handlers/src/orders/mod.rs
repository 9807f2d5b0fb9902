//! Orders pallet handler bundle.
//!
//! # Handled Events
//!
//! - `OrderCreated`, `OrderPaid`, `OrderFulfilled`, `OrderRefunded`,
//!   `OrderCancelled`
//!
//! # Storage
//!
//! - `orders` search index, one document per order id
//! - `transaction_logging` table, one row per lifecycle event

mod documents;
mod handler;

use std::sync::Arc;

use conductor_core::ports::{CommandHandler, ORDERS_INDEX};

use crate::HandlerBundle;
use crate::stores::Stores;
use crate::transactions::TransactionLogger;

pub use documents::{OrderDocument, PriceDocument};
pub use handler::OrdersHandler;

pub struct OrdersBundle {
    stores: Stores,
}

impl OrdersBundle {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }
}

impl HandlerBundle for OrdersBundle {
    fn name(&self) -> &'static str {
        "orders"
    }

    fn handlers(&self) -> Vec<Arc<dyn CommandHandler>> {
        vec![Arc::new(OrdersHandler::new(
            self.stores.search.clone(),
            TransactionLogger::new(self.stores.transactions.clone()),
        ))]
    }

    fn indices(&self) -> &'static [&'static str] {
        &[ORDERS_INDEX]
    }
}
