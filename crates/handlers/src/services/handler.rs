//! Handler for the Services pallet.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use conductor_core::commands::{Command, CommandKind, CommandPayload};
use conductor_core::error::{DomainError, HandlerResult};
use conductor_core::ports::{CommandHandler, SERVICES_INDEX, SearchIndex};

use super::documents::ServiceDocument;
use crate::utils::{delete_doc, upsert_doc};

const KINDS: &[CommandKind] = &[
    CommandKind::ServiceCreated,
    CommandKind::ServiceUpdated,
    CommandKind::ServiceDeleted,
];

pub struct ServicesHandler {
    search: Arc<dyn SearchIndex>,
}

impl ServicesHandler {
    pub fn new(search: Arc<dyn SearchIndex>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl CommandHandler for ServicesHandler {
    fn name(&self) -> &'static str {
        "services"
    }

    fn kinds(&self) -> &'static [CommandKind] {
        KINDS
    }

    async fn execute(&self, command: &Command) -> HandlerResult<()> {
        match &command.payload {
            CommandPayload::ServiceCreated { service, owner }
            | CommandPayload::ServiceUpdated { service, owner } => {
                debug!(service = %service.id, owner = %owner, "Projecting service");
                let doc = ServiceDocument::new(service, &command.block);
                upsert_doc(self.search.as_ref(), SERVICES_INDEX, &service.id, &doc).await
            }
            CommandPayload::ServiceDeleted { service, .. } => {
                delete_doc(self.search.as_ref(), SERVICES_INDEX, &service.id).await
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
    use conductor_core::models::{AccountId, BlockHash, BlockMetadata, Service};
    use conductor_core::testing::{InMemorySearchIndex, fixtures};

    fn service(owner: &AccountId) -> Service {
        serde_json::from_value(fixtures::service_json(6, owner)).unwrap()
    }

    fn command(payload: CommandPayload) -> Command {
        Command::new(payload, BlockMetadata::new(BlockHash([5; 32]), 77, 0))
    }

    #[tokio::test]
    async fn test_service_create_update_delete() {
        let search = Arc::new(InMemorySearchIndex::new());
        let handler = ServicesHandler::new(search.clone());
        let owner = AccountId([2; 32]);
        let id = format!("0x{}", "06".repeat(32));

        handler
            .execute(&command(CommandPayload::ServiceCreated {
                service: service(&owner),
                owner: owner.clone(),
            }))
            .await
            .unwrap();

        let doc = search.document(SERVICES_INDEX, &id).unwrap();
        assert_eq!(doc["owner_id"], owner.to_hex());
        assert_eq!(doc["info"]["prices_by_currency"][0]["total_price"], "25000000000000000000");
        assert_eq!(doc["info"]["expected_duration"]["duration_type"], "WorkingDays");

        handler
            .execute(&command(CommandPayload::ServiceDeleted {
                service: service(&owner),
                owner: owner.clone(),
            }))
            .await
            .unwrap();
        assert!(search.document(SERVICES_INDEX, &id).is_none());

        // Suppression répétée: sans effet
        handler
            .execute(&command(CommandPayload::ServiceDeleted {
                service: service(&owner),
                owner,
            }))
            .await
            .unwrap();
    }
}
