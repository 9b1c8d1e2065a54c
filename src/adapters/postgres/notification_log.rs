//! PostgreSQL implementation of NotificationLog, backed by `webhook_logs`.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::DomainError;
use crate::ports::{NotificationLog, NotificationLogEntry};

pub struct PostgresNotificationLog {
    pool: PgPool,
}

impl PostgresNotificationLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationLog for PostgresNotificationLog {
    async fn record(&self, entry: &NotificationLogEntry) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO webhook_logs (
                id, subscription_id, event, url, payload, success,
                response_status, error, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.subscription_id.as_uuid())
        .bind(&entry.event)
        .bind(&entry.url)
        .bind(&entry.payload)
        .bind(entry.success)
        .bind(entry.response_status.map(i32::from))
        .bind(&entry.error)
        .bind(entry.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to write webhook log: {}", e)))?;

        Ok(())
    }
}
