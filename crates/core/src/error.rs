//! Error types for the relay domain layer.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`TranslationError`] - Raw event shape does not match a command schema
//! - [`HandlerError`] - A handler could not apply its command
//! - [`DispatchError`] - Dispatcher-level failure (wraps [`HandlerError`])
//! - [`SearchError`] - Search index errors
//! - [`StorageError`] - Database/repository errors
//! - [`ChainError`] - Blockchain RPC errors
//! - [`DomainError`] - Business logic errors
//! - [`ListenerError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::time::Duration;

use thiserror::Error;

use crate::commands::CommandKind;
use crate::models::BlockMetadata;

// =============================================================================
// Domain Errors
// =============================================================================

/// Business logic and domain rule violations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Account ID failed validation.
    #[error("Invalid account ID: {0}")]
    InvalidAccountId(String),

    /// Data decoding/deserialization failed.
    #[error("Decoding error: {0}")]
    DecodingError(String),

    /// A second handler was registered for a command kind.
    #[error("Handler already registered for command {0}")]
    DuplicateHandler(CommandKind),

    /// Generic validation error.
    #[error("Validation error: {0}")]
    ValidationError(String),
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Database and repository errors.
///
/// These errors originate from storage operations like queries,
/// transactions, and data serialization.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to establish database connection.
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// SQL query execution failed.
    #[error("Query execution error: {0}")]
    QueryError(String),

    /// Database constraint was violated (unique, foreign key, etc.).
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Database migration failed.
    #[error("Migration error: {0}")]
    MigrationError(String),

    /// Transaction commit/rollback failed.
    #[error("Transaction error: {0}")]
    TransactionError(String),

    /// Data serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl StorageError {
    /// Whether a later attempt of the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConnectionError(_) | Self::TransactionError(_))
    }
}

// =============================================================================
// Search Errors
// =============================================================================

/// Search index errors.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The index node could not be reached.
    #[error("Search index connection error: {0}")]
    ConnectionError(String),

    /// The request did not complete in time.
    #[error("Search index request timed out: {0}")]
    Timeout(String),

    /// The index answered with a non-success status.
    #[error("Search index returned {status}: {body}")]
    RequestError {
        /// HTTP status code.
        status: u16,
        /// Response body (truncated by the adapter).
        body: String,
    },

    /// A document or response could not be (de)serialized.
    #[error("Search index serialization error: {0}")]
    SerializationError(String),
}

impl SearchError {
    /// Whether a later attempt of the same request may succeed.
    ///
    /// Version conflicts (409) are retried since `_update` re-reads the
    /// document on every attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::Timeout(_) => true,
            Self::RequestError { status, .. } => *status >= 500 || *status == 429 || *status == 409,
            Self::SerializationError(_) => false,
        }
    }
}

// =============================================================================
// Chain Errors
// =============================================================================

/// Blockchain RPC and connectivity errors.
///
/// These errors occur when communicating with the Substrate node
/// via WebSocket RPC.
#[derive(Debug, Error)]
pub enum ChainError {
    /// WebSocket connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// RPC request failed.
    #[error("RPC error: {0}")]
    RpcError(String),

    /// Block subscription failed or disconnected.
    #[error("Subscription error: {0}")]
    SubscriptionError(String),
}

// =============================================================================
// Translation Errors
// =============================================================================

/// A raw chain event did not match the schema of the command it maps to.
///
/// Fatal to that single event only. Both variants carry the raw arguments
/// so the mismatch between chain runtime and relay can be diagnosed.
#[derive(Debug, Error)]
pub enum TranslationError {
    /// Fewer arguments than the schema declares.
    #[error("{pallet}::{event} expects {expected} argument(s), got {actual}; args: {args}")]
    Arity {
        pallet: String,
        event: String,
        expected: usize,
        actual: usize,
        args: String,
    },

    /// An argument is present but cannot be decoded.
    #[error("{pallet}::{event} argument '{field}' (index {index}) is invalid: {reason}; args: {args}")]
    Field {
        pallet: String,
        event: String,
        field: &'static str,
        index: usize,
        reason: String,
        args: String,
    },
}

// =============================================================================
// Handler Errors
// =============================================================================

/// Failure while a handler applies a command to the external stores.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Search index write failed.
    #[error("Search index error: {0}")]
    Search(#[from] SearchError),

    /// Relational store write failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Command payload violated a domain rule.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// The notification for a state transition was not persisted.
    ///
    /// The transition is incomplete and must be surfaced, never dropped.
    #[error("Notification '{entity}' for {to} was not persisted: {source}")]
    NotificationIncomplete {
        to: String,
        entity: &'static str,
        #[source]
        source: StorageError,
    },

    /// A single handler attempt exceeded its time budget.
    #[error("Handler timed out after {0:?}")]
    Timeout(Duration),
}

impl HandlerError {
    /// Whether the dispatcher should try the command again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Search(e) => e.is_retryable(),
            Self::Storage(e) => e.is_retryable(),
            Self::NotificationIncomplete { source, .. } => source.is_retryable(),
            Self::Timeout(_) => true,
            Self::Domain(_) => false,
        }
    }
}

// =============================================================================
// Dispatch Errors
// =============================================================================

/// Failure reported by the command dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A command was translated but nothing handles its kind.
    #[error("No handler registered for command {0}")]
    NoHandler(CommandKind),

    /// The handler failed on its last attempt.
    #[error("{kind} at {block} failed after {attempts} attempt(s): {source}")]
    Handler {
        kind: CommandKind,
        block: BlockMetadata,
        attempts: u32,
        #[source]
        source: HandlerError,
    },
}

// =============================================================================
// Listener Errors
// =============================================================================

/// Top-level listener orchestration errors.
///
/// This is the main error type returned by [`crate::services::ListenerService`].
/// Translation and handler faults never surface here; they are absorbed per
/// event.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Domain logic error.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Storage/database error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Blockchain connectivity error.
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Connected chain doesn't match the stored cursor.
    ///
    /// This is a fatal error that requires manual intervention.
    #[error("Chain mismatch: connected to {connected} but database cursor belongs to {expected}")]
    ChainMismatch {
        /// Genesis hash of connected chain.
        connected: String,
        /// Genesis hash recorded in the cursor.
        expected: String,
    },

    /// Graceful shutdown was requested.
    ///
    /// This is not really an error but uses the error type for control flow.
    #[error("Listener shutdown requested")]
    ShutdownRequested,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for listener operations.
pub type ListenerResult<T> = Result<T, ListenerError>;

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for search index operations.
pub type SearchResult<T> = Result<T, SearchError>;

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// Result type for command handlers.
pub type HandlerResult<T> = Result<T, HandlerError>;

/// Result type for the translator.
pub type TranslationResult<T> = Result<T, TranslationError>;

#[cfg(test)]
mod tests {
    use super::*;

    // Test critique: la chaîne de conversion d'erreurs fonctionne
    // Permet d'utiliser ? à travers les couches
    #[test]
    fn test_error_conversion_chain() {
        let storage_err = StorageError::QueryError("db failed".into());
        let handler_err: HandlerError = storage_err.into();
        assert!(handler_err.to_string().contains("db failed"));

        let chain_err = ChainError::RpcError("rpc failed".into());
        let listener_err: ListenerError = chain_err.into();
        assert!(listener_err.to_string().contains("rpc failed"));
    }

    // Test critique: seules les erreurs transitoires sont rejouées
    #[test]
    fn test_retryable_classification() {
        assert!(HandlerError::from(SearchError::Timeout("10s".into())).is_retryable());
        assert!(
            HandlerError::from(SearchError::RequestError { status: 503, body: String::new() })
                .is_retryable()
        );
        assert!(
            !HandlerError::from(SearchError::RequestError { status: 400, body: String::new() })
                .is_retryable()
        );
        assert!(HandlerError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(!HandlerError::from(DomainError::ValidationError("bad".into())).is_retryable());
        assert!(
            !HandlerError::from(StorageError::ConstraintViolation("dup".into())).is_retryable()
        );
    }

    // Test critique: une erreur de traduction garde le payload brut pour le diagnostic
    #[test]
    fn test_translation_fault_includes_raw_args() {
        let err = TranslationError::Arity {
            pallet: "Orders".into(),
            event: "OrderPaid".into(),
            expected: 1,
            actual: 0,
            args: "[]".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Orders::OrderPaid"));
        assert!(msg.contains("expects 1"));
        assert!(msg.contains("args: []"));
    }

    #[test]
    fn test_chain_mismatch_includes_hashes() {
        let err = ListenerError::ChainMismatch {
            connected: "0xaaa".into(),
            expected: "0xbbb".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("0xaaa") && msg.contains("0xbbb"));
    }
}
