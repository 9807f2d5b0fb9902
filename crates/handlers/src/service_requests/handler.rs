//! Handler for the ServiceRequest pallet.
//!
//! # Supported Commands
//!
//! - `ServiceRequestCreated`: request document + staking transaction log
//! - `ServiceRequestClaimed`: merges the lab's offer
//! - `ServiceRequestProcessed`, `ServiceRequestFinalized`: merges the invoice

use std::sync::Arc;

use async_trait::async_trait;

use conductor_core::commands::{Command, CommandKind, CommandPayload};
use conductor_core::error::{DomainError, HandlerResult};
use conductor_core::models::{RequestStatus, TransactionStatus, TransactionType};
use conductor_core::ports::{CommandHandler, SERVICE_REQUESTS_INDEX, SearchIndex};

use super::documents::{ClaimDocument, InvoiceDocument, RequestDocument};
use crate::transactions::{Movement, TransactionLogger};
use crate::utils::{millis_to_datetime, upsert_doc};

/// Currency staked on service requests.
pub const STAKING_CURRENCY: &str = "DBIO";

const KINDS: &[CommandKind] = &[
    CommandKind::ServiceRequestCreated,
    CommandKind::ServiceRequestClaimed,
    CommandKind::ServiceRequestProcessed,
    CommandKind::ServiceRequestFinalized,
];

pub struct ServiceRequestsHandler {
    search: Arc<dyn SearchIndex>,
    transactions: TransactionLogger,
}

impl ServiceRequestsHandler {
    pub fn new(search: Arc<dyn SearchIndex>, transactions: TransactionLogger) -> Self {
        Self {
            search,
            transactions,
        }
    }
}

#[async_trait]
impl CommandHandler for ServiceRequestsHandler {
    fn name(&self) -> &'static str {
        "service-requests"
    }

    fn kinds(&self) -> &'static [CommandKind] {
        KINDS
    }

    async fn execute(&self, command: &Command) -> HandlerResult<()> {
        let search = self.search.as_ref();
        let block = &command.block;

        match &command.payload {
            CommandPayload::ServiceRequestCreated { requester, request } => {
                let doc = RequestDocument::new(request, block);
                upsert_doc(search, SERVICE_REQUESTS_INDEX, &request.hash, &doc).await?;

                self.transactions
                    .log(
                        Movement {
                            address: requester,
                            amount: request.staking_amount,
                            currency: STAKING_CURRENCY,
                            ref_number: &request.hash,
                            transaction_type: TransactionType::StakingRequestService,
                            transaction_status: TransactionStatus::Stake,
                            at: millis_to_datetime(request.created_at),
                        },
                        block,
                    )
                    .await
            }
            CommandPayload::ServiceRequestClaimed { offer, .. } => {
                let doc = ClaimDocument::new(offer, block);
                upsert_doc(search, SERVICE_REQUESTS_INDEX, &offer.request_hash, &doc).await
            }
            CommandPayload::ServiceRequestProcessed { invoice, .. } => {
                let doc = InvoiceDocument::new(invoice, RequestStatus::Processed, block);
                upsert_doc(search, SERVICE_REQUESTS_INDEX, &invoice.request_hash, &doc).await
            }
            CommandPayload::ServiceRequestFinalized { invoice, .. } => {
                let doc = InvoiceDocument::new(invoice, RequestStatus::Finalized, block);
                upsert_doc(search, SERVICE_REQUESTS_INDEX, &invoice.request_hash, &doc).await
            }
            other => Err(DomainError::ValidationError(format!(
                "{} cannot handle {}",
                self.name(),
                other.kind()
            ))
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conductor_core::models::{AccountId, BlockHash, BlockMetadata};
    use conductor_core::testing::{
        InMemorySearchIndex, InMemoryTransactionLogRepository, fixtures,
    };

    const REQUESTER: AccountId = AccountId([3; 32]);
    const LAB: AccountId = AccountId([9; 32]);

    fn block(index: u32) -> BlockMetadata {
        BlockMetadata::new(BlockHash([6; 32]), 200, index)
    }

    fn hash() -> String {
        format!("0x{}", "0e".repeat(32))
    }

    // Test critique: le document se construit étape par étape sans perdre la requête
    #[tokio::test]
    async fn test_request_lifecycle_merges_into_one_document() {
        let search = Arc::new(InMemorySearchIndex::new());
        let logs = Arc::new(InMemoryTransactionLogRepository::new());
        let handler =
            ServiceRequestsHandler::new(search.clone(), TransactionLogger::new(logs.clone()));

        let payloads = [
            CommandPayload::ServiceRequestCreated {
                requester: REQUESTER,
                request: serde_json::from_value(fixtures::request_json(0x0e, &REQUESTER))
                    .unwrap(),
            },
            CommandPayload::ServiceRequestClaimed {
                lab: LAB,
                offer: serde_json::from_value(fixtures::offer_json(0x0e, &LAB)).unwrap(),
            },
            CommandPayload::ServiceRequestProcessed {
                requester: REQUESTER,
                invoice: serde_json::from_value(fixtures::invoice_json(0x0e, &REQUESTER, &LAB))
                    .unwrap(),
            },
        ];
        for (i, payload) in payloads.into_iter().enumerate() {
            handler
                .execute(&Command::new(payload, block(i as u32)))
                .await
                .unwrap();
        }

        let doc = search.document(SERVICE_REQUESTS_INDEX, &hash()).unwrap();
        assert_eq!(doc["request"]["status"], "Processed");
        assert_eq!(doc["request"]["country"], "ID");
        assert_eq!(doc["request"]["lab_address"], LAB.to_hex());
        assert_eq!(doc["service_offer"]["qc_price"], "5000000000000000000");
        assert_eq!(doc["service_invoice"]["pay_amount"], "10000000000000000000");
        assert_eq!(doc["block_metadata"]["event_index"], 2);

        // Seule la création est journalisée
        let logs = logs.all();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].transaction_type, TransactionType::StakingRequestService);
        assert_eq!(logs[0].transaction_status, TransactionStatus::Stake);
        assert_eq!(logs[0].amount, 10_000_000_000_000_000_000);
        assert_eq!(logs[0].currency, "DBIO");
        assert_eq!(logs[0].ref_number, hash());
    }
}
