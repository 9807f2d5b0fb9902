//! Cursor repository implementation for PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;

use conductor_core::error::StorageResult;
use conductor_core::models::{BlockHash, ListenerCursor};
use conductor_core::ports::CursorRepository;

use super::database::Database;
use super::helpers::{bytes_to_hash32, map_sqlx_error, to_i32, to_i64, to_u32, to_u64};

/// PostgreSQL implementation of CursorRepository.
pub struct PgCursorRepository {
    pool: PgPool,
}

impl PgCursorRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[async_trait]
impl CursorRepository for PgCursorRepository {
    async fn get_cursor(&self, chain_id: &str) -> StorageResult<Option<ListenerCursor>> {
        let row = sqlx::query_as::<_, CursorRow>(
            r#"
            SELECT chain_id, last_block_number, last_block_hash, last_event_index, updated_at
            FROM listener_cursor
            WHERE chain_id = $1
            "#,
        )
        .bind(chain_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(CursorRow::into_cursor).transpose()
    }

    async fn get_any_cursor(&self) -> StorageResult<Option<ListenerCursor>> {
        let row = sqlx::query_as::<_, CursorRow>(
            r#"
            SELECT chain_id, last_block_number, last_block_hash, last_event_index, updated_at
            FROM listener_cursor
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(CursorRow::into_cursor).transpose()
    }

    async fn set_cursor(&self, cursor: &ListenerCursor) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO listener_cursor
                (chain_id, last_block_number, last_block_hash, last_event_index, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (chain_id) DO UPDATE SET
                last_block_number = EXCLUDED.last_block_number,
                last_block_hash = EXCLUDED.last_block_hash,
                last_event_index = EXCLUDED.last_event_index,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&cursor.chain_id)
        .bind(to_i64(cursor.last_block_number, "cursor.last_block_number")?)
        .bind(&cursor.last_block_hash.0[..])
        .bind(to_i32(cursor.last_event_index, "cursor.last_event_index")?)
        .bind(cursor.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct CursorRow {
    chain_id: String,
    last_block_number: i64,
    last_block_hash: Vec<u8>,
    last_event_index: i32,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl CursorRow {
    fn into_cursor(self) -> StorageResult<ListenerCursor> {
        Ok(ListenerCursor {
            chain_id: self.chain_id,
            last_block_number: to_u64(self.last_block_number, "cursor.last_block_number")?,
            last_block_hash: BlockHash(bytes_to_hash32(
                self.last_block_hash,
                "cursor.last_block_hash",
            )?),
            last_event_index: to_u32(self.last_event_index, "cursor.last_event_index")?,
            updated_at: self.updated_at,
        })
    }
}
