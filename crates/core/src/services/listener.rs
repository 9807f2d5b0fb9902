//! Chain listener - the relay's event loop.
//!
//! Subscribes to finalized chain events and feeds them one at a time through
//! the translator and the dispatcher. Translation and handler faults are
//! logged and never stop the loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::StreamExt;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::commands::CommandKind;
use crate::error::{ListenerError, ListenerResult};
use crate::metrics::{
    record_chain_event, record_event_redelivered, record_event_unmapped, record_translation_fault,
};
use crate::models::ListenerCursor;
use crate::ports::{ChainEvent, CursorRepository, EventSource};
use crate::services::CommandDispatcher;
use crate::translator;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the listener service.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Delay before the first resubscription attempt.
    pub initial_retry_delay: Duration,
    /// Upper bound for the resubscription delay.
    pub max_retry_delay: Duration,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            initial_retry_delay: Duration::from_millis(500),
            max_retry_delay: Duration::from_secs(30),
        }
    }
}

/// What happened to a single chain event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// The command was applied by its handler.
    Dispatched(CommandKind),
    /// No command maps to this event.
    Unmapped,
    /// The event is at or before the cursor.
    Redelivered,
    /// The payload did not match the command schema.
    TranslationFault,
    /// The handler failed after all attempts.
    HandlerFault(CommandKind),
}

// =============================================================================
// ListenerService
// =============================================================================

/// Main relay loop.
///
/// # Flow
///
/// 1. Verify the database cursor belongs to the connected chain
/// 2. Subscribe to finalized events
/// 3. Skip events at or before the cursor
/// 4. Translate and dispatch each mapped event
/// 5. Advance the cursor
pub struct ListenerService<S: EventSource, C: CursorRepository> {
    config: ListenerConfig,
    source: Arc<S>,
    cursors: Arc<C>,
    dispatcher: Arc<CommandDispatcher>,
}

impl<S: EventSource, C: CursorRepository> ListenerService<S, C> {
    pub fn new(
        config: ListenerConfig,
        source: Arc<S>,
        cursors: Arc<C>,
        dispatcher: Arc<CommandDispatcher>,
    ) -> Self {
        Self {
            config,
            source,
            cursors,
            dispatcher,
        }
    }

    /// Start the listener.
    ///
    /// Returns [`ListenerError::ShutdownRequested`] once `shutdown_rx` flips
    /// to `true`.
    #[instrument(skip_all)]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> ListenerResult<()> {
        info!("⛓️  Starting listener");

        let chain_id = self.source.genesis_hash().await?.to_hex();
        let mut cursor = self.load_cursor(&chain_id).await?;

        match &cursor {
            Some(c) => info!(
                block = c.last_block_number,
                event = c.last_event_index,
                "📍 Resuming after cursor"
            ),
            None => debug!("No cursor found, starting fresh"),
        }

        self.follow_events(&chain_id, &mut cursor, &mut shutdown_rx)
            .await
    }

    /// Load the cursor for `chain_id`, refusing a database that belongs to
    /// another chain.
    pub async fn load_cursor(&self, chain_id: &str) -> ListenerResult<Option<ListenerCursor>> {
        if let Some(existing) = self.cursors.get_any_cursor().await?
            && existing.chain_id != chain_id
        {
            error!(
                connected = &chain_id[..18.min(chain_id.len())],
                expected = &existing.chain_id[..18.min(existing.chain_id.len())],
                "❌ Chain mismatch! Database cursor belongs to a different chain"
            );
            error!(
                "   Manual action required: either connect to the correct chain or clear the database"
            );
            return Err(ListenerError::ChainMismatch {
                connected: chain_id.to_string(),
                expected: existing.chain_id,
            });
        }

        Ok(self.cursors.get_cursor(chain_id).await?)
    }

    /// Follow finalized events via subscription.
    #[instrument(skip_all)]
    async fn follow_events(
        &self,
        chain_id: &str,
        cursor: &mut Option<ListenerCursor>,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) -> ListenerResult<()> {
        let mut retry_delay = self.config.initial_retry_delay;

        loop {
            if *shutdown_rx.borrow() {
                debug!("Shutdown requested");
                return Err(ListenerError::ShutdownRequested);
            }

            match self.source.subscribe_events().await {
                Ok(mut stream) => {
                    debug!("📡 Subscription established");
                    retry_delay = self.config.initial_retry_delay;

                    loop {
                        let next = tokio::select! {
                            next = stream.next() => next,
                            changed = shutdown_rx.changed() => {
                                // Sender dropped
                                if changed.is_err() || *shutdown_rx.borrow() {
                                    debug!("Shutdown requested");
                                    return Err(ListenerError::ShutdownRequested);
                                }
                                continue;
                            }
                        };

                        match next {
                            Some(Ok(event)) => {
                                if let Err(e) = self.process_event(chain_id, &event, cursor).await {
                                    error!(
                                        block = event.block.block_number,
                                        event = event.block.event_index,
                                        error = %e,
                                        "❌ Event processing failed"
                                    );
                                }
                            }
                            Some(Err(e)) => {
                                warn!(error = %e, "⚠️  Subscription error, reconnecting...");
                                break;
                            }
                            None => {
                                warn!("⚠️  Subscription ended, reconnecting...");
                                break;
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        retry_in_ms = retry_delay.as_millis(),
                        "⚠️  Failed to subscribe, retrying..."
                    );
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(retry_delay) => {
                    debug!(retry_delay_ms = retry_delay.as_millis(), "🔄 Reconnecting to chain...");
                    retry_delay = (retry_delay * 2).min(self.config.max_retry_delay);
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        return Err(ListenerError::ShutdownRequested);
                    }
                }
            }
        }
    }

    /// Run a single event through the pipeline.
    ///
    /// Only cursor persistence can fail here; translation and handler faults
    /// are reported through the returned outcome.
    #[instrument(
        skip_all,
        fields(pallet = %event.pallet, name = %event.name, block = event.block.block_number, event = event.block.event_index)
    )]
    pub async fn process_event(
        &self,
        chain_id: &str,
        event: &ChainEvent,
        cursor: &mut Option<ListenerCursor>,
    ) -> ListenerResult<EventOutcome> {
        record_chain_event(&event.pallet);

        if cursor.as_ref().is_some_and(|c| c.covers(&event.block)) {
            trace!("Event already dispatched, skipping");
            record_event_redelivered();
            return Ok(EventOutcome::Redelivered);
        }

        let outcome =
            match translator::translate(&event.pallet, &event.name, &event.args, &event.block) {
                Ok(None) => {
                    trace!("Unmapped event");
                    record_event_unmapped();
                    return Ok(EventOutcome::Unmapped);
                }
                Ok(Some(command)) => {
                    let kind = command.kind();
                    match self.dispatcher.dispatch(&command).await {
                        Ok(()) => {
                            debug!(command = %kind, "✅ Command applied");
                            EventOutcome::Dispatched(kind)
                        }
                        Err(e) => {
                            error!(command = %kind, error = %e, "❌ Command failed");
                            EventOutcome::HandlerFault(kind)
                        }
                    }
                }
                Err(e) => {
                    error!(error = %e, "❌ Malformed event payload");
                    record_translation_fault(&event.pallet, &event.name);
                    EventOutcome::TranslationFault
                }
            };

        let next = ListenerCursor {
            chain_id: chain_id.to_string(),
            last_block_number: event.block.block_number,
            last_block_hash: event.block.block_hash.clone(),
            last_event_index: event.block.event_index,
            updated_at: Utc::now(),
        };
        self.cursors.set_cursor(&next).await?;
        *cursor = Some(next);

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlockHash, BlockMetadata};
    use crate::ports::HandlerRegistry;
    use crate::services::DispatcherConfig;
    use crate::testing::InMemoryCursorRepository;
    use crate::testing::VecEventSource;
    use serde_json::json;

    fn event(pallet: &str, name: &str, block: u64, index: u32) -> ChainEvent {
        ChainEvent {
            pallet: pallet.into(),
            name: name.into(),
            args: vec![],
            block: BlockMetadata::new(BlockHash([block as u8; 32]), block, index),
        }
    }

    fn listener(
        cursors: Arc<InMemoryCursorRepository>,
    ) -> ListenerService<VecEventSource, InMemoryCursorRepository> {
        let dispatcher = CommandDispatcher::new(
            DispatcherConfig::default(),
            Arc::new(HandlerRegistry::new()),
        );
        ListenerService::new(
            ListenerConfig::default(),
            Arc::new(VecEventSource::new(BlockHash([9; 32]), vec![])),
            cursors,
            Arc::new(dispatcher),
        )
    }

    #[tokio::test]
    async fn test_unmapped_event_is_a_noop() {
        let cursors = Arc::new(InMemoryCursorRepository::default());
        let listener = listener(cursors.clone());
        let mut cursor = None;

        let outcome = listener
            .process_event("0x09", &event("Balances", "Transfer", 1, 0), &mut cursor)
            .await
            .unwrap();

        assert_eq!(outcome, EventOutcome::Unmapped);
        assert!(cursor.is_none());
    }

    // Test critique: un payload invalide est signalé sans arrêter le flux
    #[tokio::test]
    async fn test_translation_fault_advances_cursor() {
        let cursors = Arc::new(InMemoryCursorRepository::default());
        let listener = listener(cursors.clone());
        let mut cursor = None;

        let mut bad = event("Labs", "LabRegistered", 5, 2);
        bad.args = vec![json!({"account_id": "nope"})];

        let outcome = listener.process_event("0x09", &bad, &mut cursor).await.unwrap();
        assert_eq!(outcome, EventOutcome::TranslationFault);
        assert_eq!(cursor.as_ref().map(ListenerCursor::position), Some((5, 2)));

        // La position redélivrée est ignorée
        let outcome = listener.process_event("0x09", &bad, &mut cursor).await.unwrap();
        assert_eq!(outcome, EventOutcome::Redelivered);
    }

    // Test critique: un émetteur d'arrêt abandonné arrête la boucle au lieu de la faire tourner à vide
    #[tokio::test]
    async fn test_dropped_shutdown_sender_stops_listener() {
        let dispatcher = CommandDispatcher::new(
            DispatcherConfig::default(),
            Arc::new(HandlerRegistry::new()),
        );
        let source = Arc::new(
            VecEventSource::new(BlockHash([9; 32]), vec![event("Balances", "Transfer", 1, 0)])
                .held_open(),
        );
        let listener = ListenerService::new(
            ListenerConfig::default(),
            source.clone(),
            Arc::new(InMemoryCursorRepository::default()),
            Arc::new(dispatcher),
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        drop(shutdown_tx);

        let result = tokio::time::timeout(Duration::from_secs(2), listener.run(shutdown_rx))
            .await
            .unwrap();
        assert!(matches!(result, Err(ListenerError::ShutdownRequested)));
        assert_eq!(source.subscriptions(), 1);
    }

    // Test critique: une base liée à une autre chaîne est refusée
    #[tokio::test]
    async fn test_chain_mismatch_is_fatal() {
        let cursors = Arc::new(InMemoryCursorRepository::default());
        cursors
            .set_cursor(&ListenerCursor {
                chain_id: "0xother".into(),
                last_block_number: 1,
                last_block_hash: BlockHash([0; 32]),
                last_event_index: 0,
                updated_at: Utc::now(),
            })
            .await
            .unwrap();

        let err = listener(cursors).load_cursor("0x09").await.unwrap_err();
        assert!(matches!(err, ListenerError::ChainMismatch { .. }));
    }
}
