//! Shared helper functions for PostgreSQL row conversion and error mapping.

use conductor_core::error::{StorageError, StorageResult};
use conductor_core::models::{TransactionStatus, TransactionType};

// SQLSTATE codes the relay can recover from by retrying.
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const ADMIN_SHUTDOWN: &str = "57P01";
const CANNOT_CONNECT_NOW: &str = "57P03";
// Class 08: connection exceptions
const CONNECTION_EXCEPTION_CLASS: &str = "08";

/// Map a driver error onto the storage taxonomy.
///
/// Pool exhaustion, a closed pool, socket and TLS failures are connection
/// errors, so the dispatcher retries them.
pub fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::ConnectionError(err.to_string()),
        sqlx::Error::Database(ref db) => {
            let code = db.code().map(|c| c.into_owned()).unwrap_or_default();
            if db.is_unique_violation() || db.is_foreign_key_violation() || db.is_check_violation()
            {
                StorageError::ConstraintViolation(err.to_string())
            } else if code == SERIALIZATION_FAILURE || code == DEADLOCK_DETECTED {
                StorageError::TransactionError(err.to_string())
            } else if code == ADMIN_SHUTDOWN
                || code == CANNOT_CONNECT_NOW
                || code.starts_with(CONNECTION_EXCEPTION_CLASS)
            {
                StorageError::ConnectionError(err.to_string())
            } else {
                StorageError::QueryError(err.to_string())
            }
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StorageError::SerializationError(err.to_string())
        }
        sqlx::Error::Migrate(_) => StorageError::MigrationError(err.to_string()),
        _ => StorageError::QueryError(err.to_string()),
    }
}

/// Convert a `Vec<u8>` to a fixed-size 32-byte array.
///
/// Returns an error if the length doesn't match.
pub fn bytes_to_hash32(bytes: Vec<u8>, field_name: &str) -> StorageResult<[u8; 32]> {
    bytes.try_into().map_err(|v: Vec<u8>| {
        StorageError::SerializationError(format!(
            "{} has invalid length: expected 32, got {}",
            field_name,
            v.len()
        ))
    })
}

/// Convert a `BIGINT` column to an unsigned chain position.
pub fn to_u64(value: i64, field_name: &str) -> StorageResult<u64> {
    u64::try_from(value).map_err(|_| {
        StorageError::SerializationError(format!("{field_name} is negative: {value}"))
    })
}

/// Convert an `INTEGER` column to an event index.
pub fn to_u32(value: i32, field_name: &str) -> StorageResult<u32> {
    u32::try_from(value).map_err(|_| {
        StorageError::SerializationError(format!("{field_name} is negative: {value}"))
    })
}

/// Convert a chain position to `BIGINT`.
pub fn to_i64(value: u64, field_name: &str) -> StorageResult<i64> {
    i64::try_from(value).map_err(|_| {
        StorageError::SerializationError(format!("{field_name} out of range: {value}"))
    })
}

/// Convert an event index to `INTEGER`.
pub fn to_i32(value: u32, field_name: &str) -> StorageResult<i32> {
    i32::try_from(value).map_err(|_| {
        StorageError::SerializationError(format!("{field_name} out of range: {value}"))
    })
}

/// Parse a `NUMERIC` amount read back as text.
pub fn parse_amount(text: &str, field_name: &str) -> StorageResult<u128> {
    text.parse().map_err(|_| {
        StorageError::SerializationError(format!("{field_name} is not a u128: {text}"))
    })
}

pub fn transaction_type_from_str(s: &str) -> StorageResult<TransactionType> {
    [TransactionType::Order, TransactionType::StakingRequestService]
        .into_iter()
        .find(|t| t.as_str() == s)
        .ok_or_else(|| {
            StorageError::SerializationError(format!("unknown transaction type: {s}"))
        })
}

pub fn transaction_status_from_str(s: &str) -> StorageResult<TransactionStatus> {
    [
        TransactionStatus::Unpaid,
        TransactionStatus::Paid,
        TransactionStatus::Fulfilled,
        TransactionStatus::Refunded,
        TransactionStatus::Cancelled,
        TransactionStatus::Stake,
    ]
    .into_iter()
    .find(|t| t.as_str() == s)
    .ok_or_else(|| StorageError::SerializationError(format!("unknown transaction status: {s}")))
}
