//! Port traits for the relational store.
//!
//! These traits define the storage interface used by the domain layer.
//! Implementations live in the infrastructure layer (e.g., `conductor-storage`).

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::models::{ListenerCursor, NotificationRecord, TransactionLog};

/// Repository for actor notifications.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Insert a notification.
    ///
    /// Returns `false` when a record with the same
    /// `(to, entity, role, block_number, event_index)` already exists.
    async fn insert(&self, record: &NotificationRecord) -> StorageResult<bool>;

    /// List notifications for a recipient, oldest first.
    async fn list_for(&self, to: &str, role: Option<&str>) -> StorageResult<Vec<NotificationRecord>>;
}

/// Repository for the commerce transaction log.
#[async_trait]
pub trait TransactionLogRepository: Send + Sync {
    /// Insert a log row. Returns `false` when the chain position was already
    /// logged.
    async fn insert(&self, log: &TransactionLog) -> StorageResult<bool>;

    /// List rows referencing an order id or request hash, oldest first.
    async fn list_by_ref(&self, ref_number: &str) -> StorageResult<Vec<TransactionLog>>;
}

/// Repository for listener cursor state.
#[async_trait]
pub trait CursorRepository: Send + Sync {
    /// Get current cursor for a chain.
    async fn get_cursor(&self, chain_id: &str) -> StorageResult<Option<ListenerCursor>>;

    /// Get any existing cursor (for chain mismatch detection).
    async fn get_any_cursor(&self) -> StorageResult<Option<ListenerCursor>>;

    /// Update cursor (upsert).
    async fn set_cursor(&self, cursor: &ListenerCursor) -> StorageResult<()>;
}
