//! End-to-end relay pipeline over in-memory stores.
//!
//! Chain events go through the listener, the translator, the dispatcher and
//! the default handler bundles, exactly as in production.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;

use conductor_core::error::{ListenerError, SearchError, StorageError};
use conductor_core::models::{
    AccountId, BlockHash, BlockMetadata, StakeStatus, TransactionStatus, VerificationStatus,
};
use conductor_core::ports::{
    ChainEvent, CursorRepository, GENETIC_ANALYSTS_INDEX, LABS_INDEX, NotificationRepository,
    ORDERS_INDEX, SearchIndex, TransactionLogRepository,
};
use conductor_core::services::{
    CommandDispatcher, DispatcherConfig, EventOutcome, ListenerConfig, ListenerService,
};
use conductor_core::testing::{
    InMemoryCursorRepository, InMemoryNotificationRepository, InMemorySearchIndex,
    InMemoryTransactionLogRepository, VecEventSource, fixtures,
};
use conductor_handlers::{Stores, default_bundles};

const GENESIS: BlockHash = BlockHash([0xaa; 32]);
const ANALYST: AccountId = AccountId([1; 32]);
const LAB: AccountId = AccountId([2; 32]);
const CUSTOMER: AccountId = AccountId([3; 32]);

struct Relay {
    search: Arc<InMemorySearchIndex>,
    notifications: Arc<InMemoryNotificationRepository>,
    transactions: Arc<InMemoryTransactionLogRepository>,
    cursors: Arc<InMemoryCursorRepository>,
    source: Arc<VecEventSource>,
    listener: ListenerService<VecEventSource, InMemoryCursorRepository>,
}

fn relay(events: Vec<ChainEvent>) -> Relay {
    let search = Arc::new(InMemorySearchIndex::new());
    let notifications = Arc::new(InMemoryNotificationRepository::new());
    let transactions = Arc::new(InMemoryTransactionLogRepository::new());
    let cursors = Arc::new(InMemoryCursorRepository::default());
    let source = Arc::new(VecEventSource::new(GENESIS, events));

    let stores = Stores::new(search.clone(), notifications.clone(), transactions.clone());
    let registry = default_bundles(stores).into_handler_registry().unwrap();
    let config = DispatcherConfig {
        retry_delay: Duration::from_millis(1),
        ..DispatcherConfig::default()
    };
    let dispatcher = Arc::new(CommandDispatcher::new(config, Arc::new(registry)));

    let listener = ListenerService::new(
        ListenerConfig {
            initial_retry_delay: Duration::from_millis(5),
            max_retry_delay: Duration::from_millis(20),
        },
        source.clone(),
        cursors.clone(),
        dispatcher,
    );

    Relay {
        search,
        notifications,
        transactions,
        cursors,
        source,
        listener,
    }
}

fn event(pallet: &str, name: &str, args: Vec<Value>, block: u64, index: u32) -> ChainEvent {
    ChainEvent {
        pallet: pallet.into(),
        name: name.into(),
        args,
        block: BlockMetadata::new(BlockHash([block as u8; 32]), block, index),
    }
}

fn analyst_event(name: &str, stake: StakeStatus, status: VerificationStatus, block: u64) -> ChainEvent {
    let raw = fixtures::genetic_analyst_json(&ANALYST, stake, status);
    let args = match name {
        "GeneticAnalystStakeSuccessful" | "GeneticAnalystUpdateVerificationStatus" => {
            vec![raw, Value::String(ANALYST.to_hex())]
        }
        _ => vec![raw],
    };
    event("GeneticAnalysts", name, args, block, 0)
}

async fn process_all(relay: &Relay, events: &[ChainEvent]) -> Vec<EventOutcome> {
    let chain_id = GENESIS.to_hex();
    let mut cursor = relay.listener.load_cursor(&chain_id).await.unwrap();
    let mut outcomes = Vec::new();
    for event in events {
        outcomes.push(
            relay
                .listener
                .process_event(&chain_id, event, &mut cursor)
                .await
                .unwrap(),
        );
    }
    outcomes
}

// Test critique: cycle de vie complet d'un analyste génétique
#[tokio::test]
async fn test_genetic_analyst_lifecycle() {
    use StakeStatus::*;
    use VerificationStatus::*;

    let events = vec![
        analyst_event("GeneticAnalystRegistered", Unstaked, Unverified, 10),
        analyst_event("GeneticAnalystStakeSuccessful", Staked, Unverified, 11),
        analyst_event("GeneticAnalystUpdateVerificationStatus", Staked, Verified, 12),
        analyst_event("GeneticAnalystUpdateVerificationStatus", Staked, Revoked, 13),
        analyst_event("GeneticAnalystUpdateVerificationStatus", Staked, Rejected, 14),
    ];
    let relay = relay(vec![]);

    let outcomes = process_all(&relay, &events[..2]).await;
    assert!(outcomes.iter().all(|o| matches!(o, EventOutcome::Dispatched(_))));

    let doc = relay
        .search
        .get(GENETIC_ANALYSTS_INDEX, &ANALYST.to_hex())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc["stake_status"], "Staked");
    assert_eq!(relay.notifications.all().len(), 1);
    assert_eq!(
        relay.notifications.all()[0].entity,
        "registration and verification"
    );

    process_all(&relay, &events[2..]).await;

    let received = relay
        .notifications
        .list_for(&ANALYST.to_hex(), Some("GA"))
        .await
        .unwrap();
    let entities: Vec<_> = received.iter().map(|n| n.entity.as_str()).collect();
    assert_eq!(
        entities,
        vec![
            "registration and verification",
            "Account verified",
            "Account revoked",
            "Account rejected",
        ]
    );
    assert!(
        relay
            .notifications
            .list_for(&ANALYST.to_hex(), Some("Lab"))
            .await
            .unwrap()
            .is_empty()
    );

    let deleted = analyst_event("GeneticAnalystDeleted", Staked, Rejected, 15);
    process_all(&relay, &[deleted]).await;
    assert_eq!(relay.search.count(GENETIC_ANALYSTS_INDEX).await.unwrap(), 0);
}

// Test critique: une redélivrance ne rejoue aucune écriture
#[tokio::test]
async fn test_redelivered_events_are_skipped() {
    let registered = event(
        "Labs",
        "LabRegistered",
        vec![fixtures::lab_json(&LAB, VerificationStatus::Unverified)],
        20,
        1,
    );
    let relay = relay(vec![]);

    process_all(&relay, std::slice::from_ref(&registered)).await;
    let writes = relay.search.writes();

    let outcomes = process_all(&relay, &[registered]).await;
    assert_eq!(outcomes, vec![EventOutcome::Redelivered]);
    assert_eq!(relay.search.writes(), writes);
    assert_eq!(relay.notifications.all().len(), 1);
}

#[tokio::test]
async fn test_faults_do_not_stop_the_pipeline() {
    let events = vec![
        // Unmapped
        event("Balances", "Transfer", vec![], 30, 0),
        // Missing argument
        event("Labs", "LabRegistered", vec![], 30, 1),
        event(
            "Labs",
            "LabUpdateVerificationStatus",
            vec![fixtures::lab_json(&LAB, VerificationStatus::Verified)],
            30,
            2,
        ),
    ];
    let relay = relay(vec![]);

    let outcomes = process_all(&relay, &events).await;

    assert_eq!(outcomes[0], EventOutcome::Unmapped);
    assert_eq!(outcomes[1], EventOutcome::TranslationFault);
    assert!(matches!(outcomes[2], EventOutcome::Dispatched(_)));
    assert_eq!(relay.notifications.all()[0].entity, "Account verified");

    let cursor = relay
        .cursors
        .get_cursor(&GENESIS.to_hex())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cursor.position(), (30, 2));
}

// Test critique: la notification est écrite même si l'index reste indisponible
#[tokio::test]
async fn test_notification_survives_index_outage() {
    let relay = relay(vec![]);
    relay.search.fail_next_upserts(
        std::iter::repeat_with(|| SearchError::ConnectionError("connection refused".into()))
            .take(DispatcherConfig::default().max_attempts as usize),
    );

    let outcomes = process_all(
        &relay,
        &[event(
            "Labs",
            "LabUpdateVerificationStatus",
            vec![fixtures::lab_json(&LAB, VerificationStatus::Revoked)],
            40,
            0,
        )],
    )
    .await;

    assert!(matches!(outcomes[0], EventOutcome::HandlerFault(_)));
    assert!(relay.search.document(LABS_INDEX, &LAB.to_hex()).is_none());
    assert_eq!(relay.notifications.all().len(), 1);
    assert_eq!(relay.notifications.all()[0].entity, "Account revoked");
}

#[tokio::test]
async fn test_order_commerce_is_logged() {
    let order = |status: &str| fixtures::order_json(7, &CUSTOMER, &LAB, status);
    let events = vec![
        event("Orders", "OrderCreated", vec![order("Unpaid")], 50, 0),
        event("Orders", "OrderPaid", vec![order("Paid")], 51, 0),
        event("Orders", "OrderRefunded", vec![order("Refunded")], 52, 3),
    ];
    let relay = relay(vec![]);

    process_all(&relay, &events).await;

    let order_id = format!("0x{}", "07".repeat(32));
    let logs = relay.transactions.list_by_ref(&order_id).await.unwrap();
    assert_eq!(logs.len(), relay.transactions.all().len());
    let statuses: Vec<_> = logs.iter().map(|l| l.transaction_status).collect();
    assert_eq!(
        statuses,
        vec![
            TransactionStatus::Unpaid,
            TransactionStatus::Paid,
            TransactionStatus::Refunded
        ]
    );
    assert_eq!((logs[2].block_number, logs[2].event_index), (52, 3));

    let doc = relay.search.get(ORDERS_INDEX, &order_id).await.unwrap().unwrap();
    assert_eq!(doc["status"], "Refunded");
}

async fn relay_with_latest(latest: &ChainEvent) -> Relay {
    let relay = relay(vec![]);
    process_all(&relay, std::slice::from_ref(latest)).await;
    relay
}

// Test critique: les réessais d'une commande ancienne n'écrasent jamais l'état le plus récent
#[tokio::test]
async fn test_retried_command_keeps_chain_order() {
    let order = |status: &str| fixtures::order_json(8, &CUSTOMER, &LAB, status);
    let events = vec![
        event("Orders", "OrderCreated", vec![order("Unpaid")], 70, 0),
        event("Orders", "OrderPaid", vec![order("Paid")], 71, 0),
        event("Orders", "OrderFulfilled", vec![order("Fulfilled")], 72, 0),
    ];
    let relay = relay(vec![]);
    // La première commande échoue deux fois avant de passer
    relay.search.fail_next_upserts([
        SearchError::Timeout("index busy".into()),
        SearchError::ConnectionError("connection reset".into()),
    ]);

    let outcomes = process_all(&relay, &events).await;

    assert!(outcomes.iter().all(|o| matches!(o, EventOutcome::Dispatched(_))));
    let order_id = format!("0x{}", "08".repeat(32));
    let doc = relay.search.get(ORDERS_INDEX, &order_id).await.unwrap().unwrap();
    assert_eq!(doc["status"], "Fulfilled");

    // Même document que si seule la dernière commande avait été appliquée
    let latest_only = relay_with_latest(&events[2]).await;
    assert_eq!(
        Some(doc),
        latest_only.search.get(ORDERS_INDEX, &order_id).await.unwrap()
    );

    let statuses: Vec<_> = relay
        .transactions
        .list_by_ref(&order_id)
        .await
        .unwrap()
        .iter()
        .map(|l| l.transaction_status)
        .collect();
    assert_eq!(
        statuses,
        vec![
            TransactionStatus::Unpaid,
            TransactionStatus::Paid,
            TransactionStatus::Fulfilled
        ]
    );
}

// Test critique: une coupure de la base pendant la notification est réessayée, pas perdue
#[tokio::test]
async fn test_notification_insert_retried_after_storage_outage() {
    let relay = relay(vec![]);
    relay
        .notifications
        .fail_next_inserts([StorageError::ConnectionError("pool timed out".into())]);

    let outcomes = process_all(
        &relay,
        &[event(
            "Labs",
            "LabUpdateVerificationStatus",
            vec![fixtures::lab_json(&LAB, VerificationStatus::Verified)],
            80,
            1,
        )],
    )
    .await;

    assert!(matches!(outcomes[0], EventOutcome::Dispatched(_)));
    let received = relay
        .notifications
        .list_for(&LAB.to_hex(), Some("Lab"))
        .await
        .unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].entity, "Account verified");
    assert_eq!((received[0].block_number, received[0].event_index), (80, 1));
}

// Test critique: la boucle reprend après la fin du flux et s'arrête proprement
#[tokio::test]
async fn test_run_resubscribes_and_shuts_down() {
    let relay = relay(vec![event(
        "Labs",
        "LabRegistered",
        vec![fixtures::lab_json(&LAB, VerificationStatus::Unverified)],
        60,
        0,
    )]);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let stopper = async {
        while relay.source.subscriptions() < 3 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        shutdown_tx.send(true).unwrap();
    };

    let (result, ()) = tokio::time::timeout(
        Duration::from_secs(5),
        async { tokio::join!(relay.listener.run(shutdown_rx), stopper) },
    )
    .await
    .unwrap();

    assert!(matches!(result, Err(ListenerError::ShutdownRequested)));
    // Rejouée à chaque réabonnement, l'inscription n'est appliquée qu'une fois
    assert_eq!(relay.notifications.all().len(), 1);
    assert_eq!(relay.search.writes(), 1);
}
