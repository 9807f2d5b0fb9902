//! Handler for the GeneticAnalysts pallet.
//!
//! # Supported Commands
//!
//! - `GeneticAnalystRegistered`: projection + registration notification
//! - `GeneticAnalystUpdated`, `GeneticAnalystStaked`: projection
//! - `GeneticAnalystVerificationStatusChanged`: projection + status notification
//! - `GeneticAnalystDeregistered`: document removal

use std::sync::Arc;

use async_trait::async_trait;

use conductor_core::commands::{Command, CommandKind, CommandPayload};
use conductor_core::error::{DomainError, HandlerResult};
use conductor_core::models::{ActorRole, BlockMetadata, GeneticAnalyst};
use conductor_core::ports::{CommandHandler, GENETIC_ANALYSTS_INDEX, SearchIndex};

use super::documents::GeneticAnalystDocument;
use crate::notifications::{Notifier, Transition};
use crate::utils::{delete_doc, upsert_doc};

const KINDS: &[CommandKind] = &[
    CommandKind::GeneticAnalystRegistered,
    CommandKind::GeneticAnalystUpdated,
    CommandKind::GeneticAnalystStaked,
    CommandKind::GeneticAnalystVerificationStatusChanged,
    CommandKind::GeneticAnalystDeregistered,
];

pub struct GeneticAnalystsHandler {
    search: Arc<dyn SearchIndex>,
    notifier: Notifier,
}

impl GeneticAnalystsHandler {
    pub fn new(search: Arc<dyn SearchIndex>, notifier: Notifier) -> Self {
        Self { search, notifier }
    }

    async fn project(&self, analyst: &GeneticAnalyst, block: &BlockMetadata) -> HandlerResult<()> {
        let doc = GeneticAnalystDocument::new(analyst, block);
        upsert_doc(
            self.search.as_ref(),
            GENETIC_ANALYSTS_INDEX,
            &doc.account_id,
            &doc,
        )
        .await
    }

    async fn transition(
        &self,
        analyst: &GeneticAnalyst,
        transition: Transition,
        block: &BlockMetadata,
    ) -> HandlerResult<()> {
        self.notifier
            .apply(
                self.project(analyst, block),
                &analyst.account_id,
                ActorRole::GeneticAnalyst,
                transition,
                block,
            )
            .await
    }
}

#[async_trait]
impl CommandHandler for GeneticAnalystsHandler {
    fn name(&self) -> &'static str {
        "genetic-analysts"
    }

    fn kinds(&self) -> &'static [CommandKind] {
        KINDS
    }

    async fn execute(&self, command: &Command) -> HandlerResult<()> {
        let block = &command.block;

        match &command.payload {
            CommandPayload::GeneticAnalystRegistered(analyst) => {
                self.transition(analyst, Transition::Registration, block).await
            }
            CommandPayload::GeneticAnalystUpdated(analyst)
            | CommandPayload::GeneticAnalystStaked { analyst, .. } => {
                self.project(analyst, block).await
            }
            CommandPayload::GeneticAnalystVerificationStatusChanged { analyst, .. } => {
                let transition = Transition::Verification(analyst.verification_status);
                self.transition(analyst, transition, block).await
            }
            CommandPayload::GeneticAnalystDeregistered(analyst) => {
                delete_doc(
                    self.search.as_ref(),
                    GENETIC_ANALYSTS_INDEX,
                    &analyst.account_id.to_hex(),
                )
                .await
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
    use conductor_core::error::{HandlerError, SearchError};
    use conductor_core::models::{AccountId, BlockHash, StakeStatus, VerificationStatus};
    use conductor_core::testing::{
        InMemoryNotificationRepository, InMemorySearchIndex, fixtures,
    };

    struct Harness {
        search: Arc<InMemorySearchIndex>,
        notifications: Arc<InMemoryNotificationRepository>,
        handler: GeneticAnalystsHandler,
    }

    fn harness() -> Harness {
        let search = Arc::new(InMemorySearchIndex::new());
        let notifications = Arc::new(InMemoryNotificationRepository::new());
        let handler =
            GeneticAnalystsHandler::new(search.clone(), Notifier::new(notifications.clone()));
        Harness {
            search,
            notifications,
            handler,
        }
    }

    fn analyst(status: VerificationStatus) -> GeneticAnalyst {
        GeneticAnalyst {
            verification_status: status,
            ..fixtures::genetic_analyst(AccountId([1; 32]))
        }
    }

    fn command(payload: CommandPayload, index: u32) -> Command {
        Command::new(payload, BlockMetadata::new(BlockHash([2; 32]), 30, index))
    }

    fn status_changed(status: VerificationStatus, index: u32) -> Command {
        let analyst = analyst(status);
        command(
            CommandPayload::GeneticAnalystVerificationStatusChanged {
                account: analyst.account_id.clone(),
                analyst,
            },
            index,
        )
    }

    // Test critique: appliquer deux fois la même commande laisse le même état
    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let h = harness();
        let cmd = command(
            CommandPayload::GeneticAnalystUpdated(analyst(VerificationStatus::Unverified)),
            0,
        );

        h.handler.execute(&cmd).await.unwrap();
        let first = h.search.document(GENETIC_ANALYSTS_INDEX, &AccountId([1; 32]).to_hex());
        h.handler.execute(&cmd).await.unwrap();
        let second = h.search.document(GENETIC_ANALYSTS_INDEX, &AccountId([1; 32]).to_hex());

        assert_eq!(first, second);
        assert_eq!(h.search.count(GENETIC_ANALYSTS_INDEX).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_staking_updates_stake_status() {
        let h = harness();
        let staked = GeneticAnalyst {
            stake_status: StakeStatus::Staked,
            ..analyst(VerificationStatus::Unverified)
        };
        let cmd = command(
            CommandPayload::GeneticAnalystStaked {
                account: staked.account_id.clone(),
                analyst: staked,
            },
            0,
        );

        h.handler.execute(&cmd).await.unwrap();

        let doc = h
            .search
            .document(GENETIC_ANALYSTS_INDEX, &AccountId([1; 32]).to_hex())
            .unwrap();
        assert_eq!(doc["stake_status"], "Staked");
        assert!(h.notifications.all().is_empty());
    }

    // Test critique: exactement une notification par transition
    #[tokio::test]
    async fn test_verified_transition_notifies_once() {
        let h = harness();
        let cmd = status_changed(VerificationStatus::Verified, 4);

        h.handler.execute(&cmd).await.unwrap();
        h.handler.execute(&cmd).await.unwrap();

        let records = h.notifications.all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].entity, "Account verified");
        assert_eq!(records[0].role, "GA");
        assert!(records[0].description.contains("Congrats! Your account has been verified."));

        let doc = h
            .search
            .document(GENETIC_ANALYSTS_INDEX, &AccountId([1; 32]).to_hex())
            .unwrap();
        assert_eq!(doc["verification_status"], "Verified");
    }

    #[tokio::test]
    async fn test_back_to_unverified_is_silent() {
        let h = harness();
        h.handler
            .execute(&status_changed(VerificationStatus::Unverified, 0))
            .await
            .unwrap();
        assert!(h.notifications.all().is_empty());
    }

    // Test critique: la notification survit à un échec de l'index, et l'échec est remonté
    #[tokio::test]
    async fn test_notification_persisted_when_projection_fails() {
        let h = harness();
        h.search
            .fail_next_upserts([SearchError::ConnectionError("refused".into())]);

        let err = h
            .handler
            .execute(&status_changed(VerificationStatus::Revoked, 1))
            .await
            .unwrap_err();

        assert!(matches!(err, HandlerError::Search(_)));
        assert_eq!(h.notifications.all().len(), 1);
        assert_eq!(h.notifications.all()[0].entity, "Account revoked");
    }

    #[tokio::test]
    async fn test_deregistering_absent_analyst_is_noop() {
        let h = harness();
        let cmd = command(
            CommandPayload::GeneticAnalystDeregistered(analyst(VerificationStatus::Verified)),
            0,
        );

        h.handler.execute(&cmd).await.unwrap();
        assert_eq!(h.search.count(GENETIC_ANALYSTS_INDEX).await.unwrap(), 0);
    }
}
