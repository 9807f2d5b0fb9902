//! External stores shared by all handlers.

use std::sync::Arc;

use conductor_core::ports::{NotificationRepository, SearchIndex, TransactionLogRepository};

/// Handles to the read models a handler may write to.
#[derive(Clone)]
pub struct Stores {
    pub search: Arc<dyn SearchIndex>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub transactions: Arc<dyn TransactionLogRepository>,
}

impl Stores {
    pub fn new(
        search: Arc<dyn SearchIndex>,
        notifications: Arc<dyn NotificationRepository>,
        transactions: Arc<dyn TransactionLogRepository>,
    ) -> Self {
        Self {
            search,
            notifications,
            transactions,
        }
    }
}
