//! Actor state-transition notifications.
//!
//! Labs and genetic analysts move through [`VerificationStatus`] values
//! driven by chain events. Each arrival produces exactly one notification
//! whose label and text come from a fixed table:
//!
//! | Transition   | entity                          |
//! |--------------|---------------------------------|
//! | Registration | `registration and verification` |
//! | → Verified   | `Account verified`              |
//! | → Revoked    | `Account revoked`               |
//! | → Rejected   | `Account rejected`              |
//!
//! A transition back to `Unverified` has no entry and notifies nobody.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use conductor_core::error::{HandlerError, HandlerResult};
use conductor_core::metrics::record_notification_created;
use conductor_core::models::{
    AccountId, ActorRole, BlockMetadata, NOTIFICATION_SENDER, NotificationRecord,
    VerificationStatus,
};
use conductor_core::ports::NotificationRepository;

// =============================================================================
// Classification
// =============================================================================

/// A state change an actor is notified about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Registration,
    Verification(VerificationStatus),
}

/// Label and text of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub entity: &'static str,
    pub description: &'static str,
}

pub const REGISTRATION: Classification = Classification {
    entity: "registration and verification",
    description: "You've successfully submitted your account verification.",
};

pub const VERIFIED: Classification = Classification {
    entity: "Account verified",
    description: "Congrats! Your account has been verified.",
};

pub const REVOKED: Classification = Classification {
    entity: "Account revoked",
    description: "Your account has been revoked.",
};

pub const REJECTED: Classification = Classification {
    entity: "Account rejected",
    description: "Your account verification has been rejected.",
};

/// Classify a transition. `None` means no notification is due.
pub fn classify(transition: Transition) -> Option<Classification> {
    match transition {
        Transition::Registration => Some(REGISTRATION),
        Transition::Verification(VerificationStatus::Verified) => Some(VERIFIED),
        Transition::Verification(VerificationStatus::Revoked) => Some(REVOKED),
        Transition::Verification(VerificationStatus::Rejected) => Some(REJECTED),
        Transition::Verification(VerificationStatus::Unverified) => None,
    }
}

// =============================================================================
// Notifier
// =============================================================================

/// Persists notifications for actor transitions.
#[derive(Clone)]
pub struct Notifier {
    repository: Arc<dyn NotificationRepository>,
}

impl Notifier {
    pub fn new(repository: Arc<dyn NotificationRepository>) -> Self {
        Self { repository }
    }

    /// Build the record for a transition, if one is due.
    pub fn record(
        to: &AccountId,
        role: ActorRole,
        transition: Transition,
        block: &BlockMetadata,
    ) -> Option<NotificationRecord> {
        classify(transition).map(|classification| build(to, role, classification, block))
    }

    /// Persist the notification for a transition.
    ///
    /// A redelivered transition finds its record already stored and is not
    /// duplicated. A failed insert is reported as
    /// [`HandlerError::NotificationIncomplete`].
    pub async fn notify(
        &self,
        to: &AccountId,
        role: ActorRole,
        transition: Transition,
        block: &BlockMetadata,
    ) -> HandlerResult<()> {
        let Some(classification) = classify(transition) else {
            debug!(to = %to, ?transition, "No notification for transition");
            return Ok(());
        };
        let record = build(to, role, classification, block);

        match self.repository.insert(&record).await {
            Ok(true) => {
                info!(
                    to = %record.to,
                    role = %record.role,
                    entity = %record.entity,
                    "🔔 Notification created"
                );
                record_notification_created(&record.role, &record.entity);
                Ok(())
            }
            Ok(false) => {
                debug!(to = %record.to, entity = %record.entity, "Notification already recorded");
                Ok(())
            }
            Err(source) => Err(HandlerError::NotificationIncomplete {
                to: record.to,
                entity: classification.entity,
                source,
            }),
        }
    }

    /// Apply a transition: update the read model, then notify.
    ///
    /// The notification is persisted even when the update failed.
    pub async fn apply<F>(
        &self,
        projection: F,
        to: &AccountId,
        role: ActorRole,
        transition: Transition,
        block: &BlockMetadata,
    ) -> HandlerResult<()>
    where
        F: Future<Output = HandlerResult<()>> + Send,
    {
        let projection = projection.await;
        if let Err(e) = &projection {
            warn!(to = %to, ?transition, error = %e, "⚠️  Read model update failed, notifying anyway");
        }
        let notification = self.notify(to, role, transition, block).await;
        settle(projection, notification)
    }
}

fn build(
    to: &AccountId,
    role: ActorRole,
    classification: Classification,
    block: &BlockMetadata,
) -> NotificationRecord {
    NotificationRecord {
        to: to.to_hex(),
        from: NOTIFICATION_SENDER.to_string(),
        role: role.as_str().to_string(),
        entity: classification.entity.to_string(),
        entity_type: role.entity_type().to_string(),
        reference_id: Some(to.to_hex()),
        description: classification.description.to_string(),
        read: false,
        block_number: block.block_number,
        event_index: block.event_index,
        created_at: Utc::now(),
    }
}

/// Combine the read-model update and the notification of one transition.
///
/// The notification is attempted whatever the update's outcome. A failed
/// notification takes precedence over a failed update.
pub fn settle(projection: HandlerResult<()>, notification: HandlerResult<()>) -> HandlerResult<()> {
    match (projection, notification) {
        (Ok(()), Ok(())) => Ok(()),
        (Err(e), Ok(())) => Err(e),
        (Ok(()), Err(e)) => Err(e),
        (Err(projection), Err(notification)) => {
            warn!(error = %projection, "⚠️  Read model update also failed");
            Err(notification)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conductor_core::error::{SearchError, StorageError};
    use conductor_core::models::BlockHash;
    use conductor_core::testing::InMemoryNotificationRepository;

    fn block(index: u32) -> BlockMetadata {
        BlockMetadata::new(BlockHash([3; 32]), 50, index)
    }

    // Test critique: les libellés doivent être reproduits à l'identique
    #[test]
    fn test_classification_table_is_exact() {
        let entity = |t| classify(t).map(|c| c.entity);
        let description = |t| classify(t).map(|c| c.description);

        assert_eq!(entity(Transition::Registration), Some("registration and verification"));
        assert_eq!(
            description(Transition::Registration),
            Some("You've successfully submitted your account verification.")
        );

        use VerificationStatus::*;
        assert_eq!(entity(Transition::Verification(Verified)), Some("Account verified"));
        assert_eq!(
            description(Transition::Verification(Verified)),
            Some("Congrats! Your account has been verified.")
        );
        assert_eq!(entity(Transition::Verification(Revoked)), Some("Account revoked"));
        assert_eq!(
            description(Transition::Verification(Revoked)),
            Some("Your account has been revoked.")
        );
        assert_eq!(entity(Transition::Verification(Rejected)), Some("Account rejected"));
        assert_eq!(
            description(Transition::Verification(Rejected)),
            Some("Your account verification has been rejected.")
        );
        assert_eq!(classify(Transition::Verification(Unverified)), None);
    }

    #[test]
    fn test_record_fields() {
        let account = AccountId([4; 32]);
        let record = Notifier::record(
            &account,
            ActorRole::GeneticAnalyst,
            Transition::Verification(VerificationStatus::Verified),
            &block(1),
        )
        .unwrap();

        assert_eq!(record.to, account.to_hex());
        assert_eq!(record.role, "GA");
        assert_eq!(record.from, "Debio Network");
        assert_eq!(record.entity_type, "Genetic Analyst");
        assert!(!record.read);
        assert_eq!((record.block_number, record.event_index), (50, 1));
    }

    // Test critique: une redélivrance ne duplique pas la notification
    #[tokio::test]
    async fn test_redelivered_transition_is_not_duplicated() {
        let repo = Arc::new(InMemoryNotificationRepository::new());
        let notifier = Notifier::new(repo.clone());
        let account = AccountId([4; 32]);

        for _ in 0..2 {
            notifier
                .notify(&account, ActorRole::Lab, Transition::Registration, &block(0))
                .await
                .unwrap();
        }

        assert_eq!(repo.all().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_insert_is_incomplete_transition() {
        let repo = Arc::new(InMemoryNotificationRepository::new());
        repo.fail_next_inserts([StorageError::ConnectionError("down".into())]);
        let notifier = Notifier::new(repo);

        let err = notifier
            .notify(
                &AccountId([4; 32]),
                ActorRole::Lab,
                Transition::Verification(VerificationStatus::Rejected),
                &block(0),
            )
            .await
            .unwrap_err();

        match &err {
            HandlerError::NotificationIncomplete { entity, .. } => {
                assert_eq!(*entity, "Account rejected");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(err.is_retryable());
    }

    #[test]
    fn test_settle_prefers_notification_failure() {
        let projection: HandlerResult<()> =
            Err(SearchError::RequestError { status: 503, body: String::new() }.into());
        let notification: HandlerResult<()> = Err(HandlerError::NotificationIncomplete {
            to: "0x04".into(),
            entity: "Account verified",
            source: StorageError::QueryError("boom".into()),
        });

        let err = settle(projection, notification).unwrap_err();
        assert!(matches!(err, HandlerError::NotificationIncomplete { .. }));

        let projection: HandlerResult<()> =
            Err(SearchError::RequestError { status: 503, body: String::new() }.into());
        assert!(matches!(settle(projection, Ok(())), Err(HandlerError::Search(_))));
    }
}
