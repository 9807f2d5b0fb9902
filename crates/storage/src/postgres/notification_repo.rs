//! Notification repository implementation for PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;

use conductor_core::error::StorageResult;
use conductor_core::models::NotificationRecord;
use conductor_core::ports::NotificationRepository;

use super::database::Database;
use super::helpers::{map_sqlx_error, to_i32, to_i64, to_u32, to_u64};

/// PostgreSQL implementation of NotificationRepository.
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn insert(&self, record: &NotificationRecord) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO notifications (
                "to", "from", role, entity, entity_type, reference_id,
                description, read, block_number, event_index, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            ON CONFLICT ("to", entity, role, block_number, event_index) DO NOTHING
            "#,
        )
        .bind(&record.to)
        .bind(&record.from)
        .bind(&record.role)
        .bind(&record.entity)
        .bind(&record.entity_type)
        .bind(&record.reference_id)
        .bind(&record.description)
        .bind(record.read)
        .bind(to_i64(record.block_number, "notification.block_number")?)
        .bind(to_i32(record.event_index, "notification.event_index")?)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_for(
        &self,
        to: &str,
        role: Option<&str>,
    ) -> StorageResult<Vec<NotificationRecord>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT "to", "from", role, entity, entity_type, reference_id,
                   description, read, block_number, event_index, created_at
            FROM notifications
            WHERE "to" = $1 AND ($2::TEXT IS NULL OR role = $2)
            ORDER BY block_number, event_index, id
            "#,
        )
        .bind(to)
        .bind(role)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(NotificationRow::into_record).collect()
    }
}

#[derive(sqlx::FromRow)]
struct NotificationRow {
    to: String,
    from: String,
    role: String,
    entity: String,
    entity_type: String,
    reference_id: Option<String>,
    description: String,
    read: bool,
    block_number: i64,
    event_index: i32,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl NotificationRow {
    fn into_record(self) -> StorageResult<NotificationRecord> {
        Ok(NotificationRecord {
            to: self.to,
            from: self.from,
            role: self.role,
            entity: self.entity,
            entity_type: self.entity_type,
            reference_id: self.reference_id,
            description: self.description,
            read: self.read,
            block_number: to_u64(self.block_number, "notification.block_number")?,
            event_index: to_u32(self.event_index, "notification.event_index")?,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::Utc;
    use conductor_core::error::StorageError;

    use crate::DatabaseConfig;

    // Test critique: une panne de la base pendant l'insertion reste réessayable
    #[tokio::test]
    async fn test_insert_against_unreachable_database_is_retryable() {
        let config = DatabaseConfig::for_relay("postgres://conductor@127.0.0.1:1/conductor")
            .with_acquire_timeout(Duration::from_millis(300));
        let repo = PgNotificationRepository::new(&Database::connect_lazy(&config).unwrap());

        let record = NotificationRecord {
            to: "0x01".into(),
            from: "Debio Network".into(),
            role: "GA".into(),
            entity: "Account verified".into(),
            entity_type: "Genetic Analyst".into(),
            reference_id: None,
            description: "Congrats! Your account has been verified.".into(),
            read: false,
            block_number: 12,
            event_index: 0,
            created_at: Utc::now(),
        };

        let err = repo.insert(&record).await.unwrap_err();
        assert!(matches!(err, StorageError::ConnectionError(_)), "{err:?}");
        assert!(err.is_retryable());
    }
}
