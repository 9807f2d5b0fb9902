//! In-memory port implementations and fixtures for tests.
//!
//! Enabled for this crate's unit tests and, through the `testing` feature,
//! for dependent crates' tests.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;

use crate::error::{ChainResult, SearchError, SearchResult, StorageError, StorageResult};
use crate::models::{BlockHash, ListenerCursor, NotificationRecord, TransactionLog};
use crate::ports::{
    ChainEvent, ChainEventStream, CursorRepository, EventSource, NotificationRepository,
    SearchIndex, TransactionLogRepository,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Search index
// =============================================================================

/// Search index kept in memory.
///
/// Upserts merge objects recursively and replace everything else, like a
/// partial document update.
#[derive(Default)]
pub struct InMemorySearchIndex {
    indices: Mutex<HashMap<String, BTreeMap<String, Value>>>,
    upsert_failures: Mutex<VecDeque<SearchError>>,
    writes: AtomicUsize,
}

impl InMemorySearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next upserts fail with these errors, in order.
    pub fn fail_next_upserts(&self, errors: impl IntoIterator<Item = SearchError>) {
        lock(&self.upsert_failures).extend(errors);
    }

    /// Current source of a document.
    pub fn document(&self, index: &str, id: &str) -> Option<Value> {
        lock(&self.indices).get(index)?.get(id).cloned()
    }

    /// Number of successful writes across all indices.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

fn merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

#[async_trait]
impl SearchIndex for InMemorySearchIndex {
    async fn upsert(&self, index: &str, id: &str, doc: Value) -> SearchResult<()> {
        if let Some(err) = lock(&self.upsert_failures).pop_front() {
            return Err(err);
        }
        if !doc.is_object() {
            return Err(SearchError::RequestError {
                status: 400,
                body: "document must be an object".into(),
            });
        }

        let mut indices = lock(&self.indices);
        let docs = indices.entry(index.to_string()).or_default();
        match docs.get_mut(id) {
            Some(existing) => merge(existing, doc),
            None => {
                docs.insert(id.to_string(), doc);
            }
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get(&self, index: &str, id: &str) -> SearchResult<Option<Value>> {
        Ok(self.document(index, id))
    }

    async fn delete(&self, index: &str, id: &str) -> SearchResult<bool> {
        let removed = lock(&self.indices)
            .get_mut(index)
            .and_then(|docs| docs.remove(id))
            .is_some();
        if removed {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(removed)
    }

    async fn count(&self, index: &str) -> SearchResult<u64> {
        Ok(lock(&self.indices)
            .get(index)
            .map_or(0, |docs| docs.len() as u64))
    }
}

// =============================================================================
// Relational store
// =============================================================================

#[derive(Default)]
pub struct InMemoryNotificationRepository {
    records: Mutex<Vec<NotificationRecord>>,
    insert_failures: Mutex<VecDeque<StorageError>>,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next inserts fail with these errors, in order.
    pub fn fail_next_inserts(&self, errors: impl IntoIterator<Item = StorageError>) {
        lock(&self.insert_failures).extend(errors);
    }

    /// All stored records, in insertion order.
    pub fn all(&self) -> Vec<NotificationRecord> {
        lock(&self.records).clone()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn insert(&self, record: &NotificationRecord) -> StorageResult<bool> {
        if let Some(err) = lock(&self.insert_failures).pop_front() {
            return Err(err);
        }

        let mut records = lock(&self.records);
        let duplicate = records.iter().any(|r| {
            r.to == record.to
                && r.entity == record.entity
                && r.role == record.role
                && r.block_number == record.block_number
                && r.event_index == record.event_index
        });
        if duplicate {
            return Ok(false);
        }
        records.push(record.clone());
        Ok(true)
    }

    async fn list_for(&self, to: &str, role: Option<&str>) -> StorageResult<Vec<NotificationRecord>> {
        Ok(lock(&self.records)
            .iter()
            .filter(|r| r.to == to && role.is_none_or(|role| r.role == role))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryTransactionLogRepository {
    logs: Mutex<Vec<TransactionLog>>,
}

impl InMemoryTransactionLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<TransactionLog> {
        lock(&self.logs).clone()
    }
}

#[async_trait]
impl TransactionLogRepository for InMemoryTransactionLogRepository {
    async fn insert(&self, log: &TransactionLog) -> StorageResult<bool> {
        let mut logs = lock(&self.logs);
        if logs
            .iter()
            .any(|l| l.block_number == log.block_number && l.event_index == log.event_index)
        {
            return Ok(false);
        }
        logs.push(log.clone());
        Ok(true)
    }

    async fn list_by_ref(&self, ref_number: &str) -> StorageResult<Vec<TransactionLog>> {
        Ok(lock(&self.logs)
            .iter()
            .filter(|l| l.ref_number == ref_number)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryCursorRepository {
    cursors: Mutex<HashMap<String, ListenerCursor>>,
}

#[async_trait]
impl CursorRepository for InMemoryCursorRepository {
    async fn get_cursor(&self, chain_id: &str) -> StorageResult<Option<ListenerCursor>> {
        Ok(lock(&self.cursors).get(chain_id).cloned())
    }

    async fn get_any_cursor(&self) -> StorageResult<Option<ListenerCursor>> {
        Ok(lock(&self.cursors).values().next().cloned())
    }

    async fn set_cursor(&self, cursor: &ListenerCursor) -> StorageResult<()> {
        lock(&self.cursors).insert(cursor.chain_id.clone(), cursor.clone());
        Ok(())
    }
}

// =============================================================================
// Event source
// =============================================================================

/// Event source replaying a fixed list of events on every subscription.
///
/// Resubscribing therefore redelivers everything, like a node reconnect.
pub struct VecEventSource {
    genesis: BlockHash,
    events: Vec<ChainEvent>,
    subscriptions: AtomicUsize,
    hold_open: bool,
}

impl VecEventSource {
    pub fn new(genesis: BlockHash, events: Vec<ChainEvent>) -> Self {
        Self {
            genesis,
            events,
            subscriptions: AtomicUsize::new(0),
            hold_open: false,
        }
    }

    /// Keep each subscription pending after the last event instead of ending it.
    pub fn held_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    pub fn subscriptions(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventSource for VecEventSource {
    async fn genesis_hash(&self) -> ChainResult<BlockHash> {
        Ok(self.genesis.clone())
    }

    async fn subscribe_events(&self) -> ChainResult<ChainEventStream> {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        let events = futures::stream::iter(self.events.clone().into_iter().map(Ok));
        if self.hold_open {
            Ok(events.chain(futures::stream::pending()).boxed())
        } else {
            Ok(events.boxed())
        }
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub mod fixtures {
    //! Chain payloads in the JSON shape the Substrate adapter produces.

    use serde_json::{Value, json};

    use crate::models::{AccountId, GeneticAnalyst, Lab, StakeStatus, VerificationStatus};

    pub fn genetic_analyst_json(
        account: &AccountId,
        stake: StakeStatus,
        status: VerificationStatus,
    ) -> Value {
        json!({
            "account_id": account.to_hex(),
            "services": [],
            "qualifications": [],
            "info": {
                "box_public_key": format!("0x{}", "0a".repeat(32)),
                "first_name": "Jane",
                "last_name": "Doe",
                "gender": "Female",
                "date_of_birth": "631152000000",
                "email": "jane@debio.network",
                "phone_number": "+6281234",
                "specialization": "Genomics",
                "profile_link": "https://debio.network/jane",
                "profile_image": null,
            },
            "stake_amount": "50000000000000000000000",
            "stake_status": stake.as_str(),
            "verification_status": status.as_str(),
            "availability_status": "Available",
        })
    }

    pub fn genetic_analyst(account: AccountId) -> GeneticAnalyst {
        let raw =
            genetic_analyst_json(&account, StakeStatus::Unstaked, VerificationStatus::Unverified);
        from_json(raw)
    }

    pub fn lab_json(account: &AccountId, status: VerificationStatus) -> Value {
        // Object-shaped enum, as some metadata versions render it
        let mut verification_status = serde_json::Map::new();
        verification_status.insert(status.as_str().to_string(), json!([]));

        json!({
            "account_id": account.to_hex(),
            "services": [],
            "certifications": [],
            "info": {
                "box_public_key": format!("0x{}", "0b".repeat(32)),
                "name": "Prodia",
                "email": "lab@prodia.co.id",
                "country": "ID",
                "region": "JB",
                "city": "Bandung",
                "address": "Jl. Merdeka 1",
                "phone_number": "+6222",
                "website": "https://prodia.co.id",
                "latitude": "-6.9",
                "longitude": "107.6",
                "profile_image": null,
            },
            "verification_status": verification_status,
            "stake_amount": "0",
            "stake_status": "Unstaked",
        })
    }

    pub fn lab(account: AccountId, status: VerificationStatus) -> Lab {
        from_json(lab_json(&account, status))
    }

    pub fn order_json(id: u8, customer: &AccountId, seller: &AccountId, status: &str) -> Value {
        json!({
            "id": format!("0x{}", hex::encode([id; 32])),
            "service_id": format!("0x{}", "5e".repeat(32)),
            "customer_id": customer.to_hex(),
            "customer_box_public_key": format!("0x{}", "0c".repeat(32)),
            "seller_id": seller.to_hex(),
            "dna_sample_tracking_id": "Y9JCOABLP16GKHR",
            "currency": "DBIO",
            "prices": [{ "component": "testing_price", "value": "20000000000000000000" }],
            "additional_prices": [{ "component": "qc_price", "value": "5000000000000000000" }],
            "status": status,
            "order_flow": "RequestTest",
            "created_at": "1650000000000",
            "updated_at": "1650000100000",
        })
    }

    pub fn service_json(id: u8, owner: &AccountId) -> Value {
        json!({
            "id": format!("0x{}", hex::encode([id; 32])),
            "owner_id": owner.to_hex(),
            "info": {
                "name": "Whole Genome Sequencing",
                "prices_by_currency": [{
                    "currency": "DBIO",
                    "total_price": "25000000000000000000",
                    "price_components": [{ "component": "testing_price", "value": "20000000000000000000" }],
                    "additional_prices": [{ "component": "qc_price", "value": "5000000000000000000" }],
                }],
                "expected_duration": { "duration": 7, "duration_type": "WorkingDays" },
                "category": "Genomics",
                "description": "WGS",
                "dna_collection_process": "Saliva",
                "test_result_sample": "https://sample",
                "long_description": null,
                "image": null,
            },
        })
    }

    pub fn request_json(hash: u8, requester: &AccountId) -> Value {
        json!({
            "hash": format!("0x{}", hex::encode([hash; 32])),
            "requester_address": requester.to_hex(),
            "lab_address": null,
            "country": "ID",
            "region": "JB",
            "city": "Bandung",
            "service_category": "Genomics",
            "staking_amount": "10000000000000000000",
            "status": "Open",
            "created_at": "1650000000000",
            "updated_at": null,
            "unstaked_at": null,
        })
    }

    pub fn offer_json(request_hash: u8, lab: &AccountId) -> Value {
        json!({
            "request_hash": format!("0x{}", hex::encode([request_hash; 32])),
            "lab_address": lab.to_hex(),
            "service_id": format!("0x{}", "5e".repeat(32)),
            "testing_price": "20000000000000000000",
            "qc_price": "5000000000000000000",
        })
    }

    pub fn invoice_json(request_hash: u8, customer: &AccountId, seller: &AccountId) -> Value {
        json!({
            "request_hash": format!("0x{}", hex::encode([request_hash; 32])),
            "order_id": format!("0x{}", "0d".repeat(32)),
            "service_id": format!("0x{}", "5e".repeat(32)),
            "customer_address": customer.to_hex(),
            "seller_address": seller.to_hex(),
            "dna_sample_tracking_id": "Y9JCOABLP16GKHR",
            "testing_price": "20000000000000000000",
            "qc_price": "5000000000000000000",
            "pay_amount": "10000000000000000000",
        })
    }

    fn from_json<T: serde::de::DeserializeOwned>(raw: Value) -> T {
        match serde_json::from_value(raw) {
            Ok(value) => value,
            Err(e) => panic!("invalid fixture: {e}"),
        }
    }
}
