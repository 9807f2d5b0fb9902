//! Handler for the Labs pallet.

use std::sync::Arc;

use async_trait::async_trait;

use conductor_core::commands::{Command, CommandKind, CommandPayload};
use conductor_core::error::{DomainError, HandlerResult};
use conductor_core::models::{ActorRole, BlockMetadata, Lab};
use conductor_core::ports::{CommandHandler, LABS_INDEX, SearchIndex};

use super::documents::LabDocument;
use crate::notifications::{Notifier, Transition};
use crate::utils::{delete_doc, upsert_doc};

const KINDS: &[CommandKind] = &[
    CommandKind::LabRegistered,
    CommandKind::LabUpdated,
    CommandKind::LabVerificationStatusChanged,
    CommandKind::LabDeregistered,
];

pub struct LabsHandler {
    search: Arc<dyn SearchIndex>,
    notifier: Notifier,
}

impl LabsHandler {
    pub fn new(search: Arc<dyn SearchIndex>, notifier: Notifier) -> Self {
        Self { search, notifier }
    }

    async fn project(&self, lab: &Lab, block: &BlockMetadata) -> HandlerResult<()> {
        let doc = LabDocument::new(lab, block);
        upsert_doc(self.search.as_ref(), LABS_INDEX, &doc.account_id, &doc).await
    }
}

#[async_trait]
impl CommandHandler for LabsHandler {
    fn name(&self) -> &'static str {
        "labs"
    }

    fn kinds(&self) -> &'static [CommandKind] {
        KINDS
    }

    async fn execute(&self, command: &Command) -> HandlerResult<()> {
        let block = &command.block;

        let (lab, transition) = match &command.payload {
            CommandPayload::LabRegistered(lab) => (lab, Transition::Registration),
            CommandPayload::LabVerificationStatusChanged(lab) => {
                (lab, Transition::Verification(lab.verification_status))
            }
            CommandPayload::LabUpdated(lab) => return self.project(lab, block).await,
            CommandPayload::LabDeregistered(lab) => {
                return delete_doc(self.search.as_ref(), LABS_INDEX, &lab.account_id.to_hex())
                    .await;
            }
            other => {
                return Err(DomainError::ValidationError(format!(
                    "{} cannot handle {}",
                    self.name(),
                    other.kind()
                ))
                .into());
            }
        };

        self.notifier
            .apply(
                self.project(lab, block),
                &lab.account_id,
                ActorRole::Lab,
                transition,
                block,
            )
            .await
    }
}
