//! Transaction log repository implementation for PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;

use conductor_core::error::StorageResult;
use conductor_core::models::TransactionLog;
use conductor_core::ports::TransactionLogRepository;

use super::database::Database;
use super::helpers::{
    map_sqlx_error, parse_amount, to_i32, to_i64, to_u32, to_u64, transaction_status_from_str,
    transaction_type_from_str,
};

/// PostgreSQL implementation of TransactionLogRepository.
pub struct PgTransactionLogRepository {
    pool: PgPool,
}

impl PgTransactionLogRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[async_trait]
impl TransactionLogRepository for PgTransactionLogRepository {
    async fn insert(&self, log: &TransactionLog) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO transaction_logging (
                address, amount, currency, ref_number, transaction_type,
                transaction_status, block_number, event_index, created_at
            )
            VALUES ($1, $2::NUMERIC, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (block_number, event_index) DO NOTHING
            "#,
        )
        .bind(&log.address)
        .bind(log.amount.to_string())
        .bind(&log.currency)
        .bind(&log.ref_number)
        .bind(log.transaction_type.as_str())
        .bind(log.transaction_status.as_str())
        .bind(to_i64(log.block_number, "transaction.block_number")?)
        .bind(to_i32(log.event_index, "transaction.event_index")?)
        .bind(log.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_by_ref(&self, ref_number: &str) -> StorageResult<Vec<TransactionLog>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT address, amount::TEXT AS amount, currency, ref_number, transaction_type,
                   transaction_status, block_number, event_index, created_at
            FROM transaction_logging
            WHERE ref_number = $1
            ORDER BY block_number, event_index
            "#,
        )
        .bind(ref_number)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(TransactionRow::into_log).collect()
    }
}

#[derive(sqlx::FromRow)]
struct TransactionRow {
    address: String,
    amount: String,
    currency: String,
    ref_number: String,
    transaction_type: String,
    transaction_status: String,
    block_number: i64,
    event_index: i32,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TransactionRow {
    fn into_log(self) -> StorageResult<TransactionLog> {
        Ok(TransactionLog {
            address: self.address,
            amount: parse_amount(&self.amount, "transaction.amount")?,
            currency: self.currency,
            ref_number: self.ref_number,
            transaction_type: transaction_type_from_str(&self.transaction_type)?,
            transaction_status: transaction_status_from_str(&self.transaction_status)?,
            block_number: to_u64(self.block_number, "transaction.block_number")?,
            event_index: to_u32(self.event_index, "transaction.event_index")?,
            created_at: self.created_at,
        })
    }
}
