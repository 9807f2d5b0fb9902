//! Handler for the Orders pallet.
//!
//! Every lifecycle event overwrites the order document and appends one
//! transaction log row for the customer.

use std::sync::Arc;

use async_trait::async_trait;

use conductor_core::commands::{Command, CommandKind, CommandPayload};
use conductor_core::error::{DomainError, HandlerResult};
use conductor_core::models::{Order, TransactionStatus, TransactionType};
use conductor_core::ports::{CommandHandler, ORDERS_INDEX, SearchIndex};

use super::documents::OrderDocument;
use crate::transactions::{Movement, TransactionLogger};
use crate::utils::{millis_to_datetime, upsert_doc};

const KINDS: &[CommandKind] = &[
    CommandKind::OrderCreated,
    CommandKind::OrderPaid,
    CommandKind::OrderFulfilled,
    CommandKind::OrderRefunded,
    CommandKind::OrderCancelled,
];

pub struct OrdersHandler {
    search: Arc<dyn SearchIndex>,
    transactions: TransactionLogger,
}

impl OrdersHandler {
    pub fn new(search: Arc<dyn SearchIndex>, transactions: TransactionLogger) -> Self {
        Self {
            search,
            transactions,
        }
    }
}

fn lifecycle(payload: &CommandPayload) -> Option<(&Order, TransactionStatus)> {
    match payload {
        CommandPayload::OrderCreated(order) => Some((order, TransactionStatus::Unpaid)),
        CommandPayload::OrderPaid(order) => Some((order, TransactionStatus::Paid)),
        CommandPayload::OrderFulfilled(order) => Some((order, TransactionStatus::Fulfilled)),
        CommandPayload::OrderRefunded(order) => Some((order, TransactionStatus::Refunded)),
        CommandPayload::OrderCancelled(order) => Some((order, TransactionStatus::Cancelled)),
        _ => None,
    }
}

#[async_trait]
impl CommandHandler for OrdersHandler {
    fn name(&self) -> &'static str {
        "orders"
    }

    fn kinds(&self) -> &'static [CommandKind] {
        KINDS
    }

    async fn execute(&self, command: &Command) -> HandlerResult<()> {
        let Some((order, status)) = lifecycle(&command.payload) else {
            return Err(DomainError::ValidationError(format!(
                "{} cannot handle {}",
                self.name(),
                command.kind()
            ))
            .into());
        };

        let doc = OrderDocument::new(order, &command.block);
        upsert_doc(self.search.as_ref(), ORDERS_INDEX, &order.id, &doc).await?;

        self.transactions
            .log(
                Movement {
                    address: &order.customer_id,
                    amount: order.total_price(),
                    currency: &order.currency,
                    ref_number: &order.id,
                    transaction_type: TransactionType::Order,
                    transaction_status: status,
                    at: millis_to_datetime(order.updated_at),
                },
                &command.block,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conductor_core::models::{AccountId, BlockHash, BlockMetadata};
    use conductor_core::testing::{
        InMemorySearchIndex, InMemoryTransactionLogRepository, fixtures,
    };

    const CUSTOMER: AccountId = AccountId([3; 32]);
    const SELLER: AccountId = AccountId([4; 32]);

    fn order(status: &str) -> Order {
        serde_json::from_value(fixtures::order_json(1, &CUSTOMER, &SELLER, status)).unwrap()
    }

    fn block(index: u32) -> BlockMetadata {
        BlockMetadata::new(BlockHash([8; 32]), 100, index)
    }

    fn setup() -> (
        Arc<InMemorySearchIndex>,
        Arc<InMemoryTransactionLogRepository>,
        OrdersHandler,
    ) {
        let search = Arc::new(InMemorySearchIndex::new());
        let logs = Arc::new(InMemoryTransactionLogRepository::new());
        let handler = OrdersHandler::new(search.clone(), TransactionLogger::new(logs.clone()));
        (search, logs, handler)
    }

    #[tokio::test]
    async fn test_order_lifecycle_is_logged() {
        let (search, logs, handler) = setup();

        let steps = [
            CommandPayload::OrderCreated(order("Unpaid")),
            CommandPayload::OrderPaid(order("Paid")),
            CommandPayload::OrderFulfilled(order("Fulfilled")),
        ];
        for (i, payload) in steps.into_iter().enumerate() {
            handler
                .execute(&Command::new(payload, block(i as u32)))
                .await
                .unwrap();
        }

        let order_id = format!("0x{}", "01".repeat(32));
        let doc = search.document(ORDERS_INDEX, &order_id).unwrap();
        assert_eq!(doc["status"], "Fulfilled");
        assert_eq!(doc["customer_id"], CUSTOMER.to_hex());
        assert_eq!(doc["prices"][0]["value"], "20000000000000000000");

        let statuses: Vec<_> = logs
            .all()
            .into_iter()
            .map(|l| l.transaction_status.as_str())
            .collect();
        assert_eq!(statuses, vec!["Unpaid", "Paid", "Fulfilled"]);
    }

    // Test critique: le montant journalisé inclut les prix additionnels
    #[tokio::test]
    async fn test_log_amount_is_total_price() {
        let (_, logs, handler) = setup();

        handler
            .execute(&Command::new(CommandPayload::OrderRefunded(order("Refunded")), block(0)))
            .await
            .unwrap();

        let log = &logs.all()[0];
        assert_eq!(log.amount, 25_000_000_000_000_000_000);
        assert_eq!(log.address, CUSTOMER.to_hex());
        assert_eq!(log.currency, "DBIO");
        assert_eq!(log.transaction_type, TransactionType::Order);
        assert_eq!(log.created_at.timestamp_millis(), 1_650_000_100_000);
    }

    #[tokio::test]
    async fn test_redelivered_order_logs_once() {
        let (_, logs, handler) = setup();
        let cmd = Command::new(CommandPayload::OrderCancelled(order("Cancelled")), block(2));

        handler.execute(&cmd).await.unwrap();
        handler.execute(&cmd).await.unwrap();

        assert_eq!(logs.all().len(), 1);
    }
}
