//! Commerce transaction logging.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use conductor_core::error::HandlerResult;
use conductor_core::models::{
    AccountId, BlockMetadata, TransactionLog, TransactionStatus, TransactionType,
};
use conductor_core::ports::TransactionLogRepository;

/// Writes one audit row per commerce command.
#[derive(Clone)]
pub struct TransactionLogger {
    repository: Arc<dyn TransactionLogRepository>,
}

/// What a commerce command moved.
#[derive(Debug, Clone)]
pub struct Movement<'a> {
    pub address: &'a AccountId,
    pub amount: u128,
    pub currency: &'a str,
    pub ref_number: &'a str,
    pub transaction_type: TransactionType,
    pub transaction_status: TransactionStatus,
    pub at: DateTime<Utc>,
}

impl TransactionLogger {
    pub fn new(repository: Arc<dyn TransactionLogRepository>) -> Self {
        Self { repository }
    }

    /// Log a movement at the command's chain position.
    ///
    /// Idempotent on `(block_number, event_index)`.
    pub async fn log(&self, movement: Movement<'_>, block: &BlockMetadata) -> HandlerResult<()> {
        let log = TransactionLog {
            address: movement.address.to_hex(),
            amount: movement.amount,
            currency: movement.currency.to_string(),
            ref_number: movement.ref_number.to_string(),
            transaction_type: movement.transaction_type,
            transaction_status: movement.transaction_status,
            block_number: block.block_number,
            event_index: block.event_index,
            created_at: movement.at,
        };

        let inserted = self.repository.insert(&log).await?;
        debug!(
            ref_number = %log.ref_number,
            status = log.transaction_status.as_str(),
            inserted,
            "Transaction logged"
        );
        Ok(())
    }
}
