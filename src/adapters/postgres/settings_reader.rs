//! PostgreSQL implementation of SettingsReader, backed by `system_settings`.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::DomainError;
use crate::ports::SettingsReader;

pub struct PostgresSettingsReader {
    pool: PgPool,
}

impl PostgresSettingsReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsReader for PostgresSettingsReader {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let row: Option<(Option<String>,)> =
            sqlx::query_as("SELECT value FROM system_settings WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DomainError::database(format!("Failed to read setting {}: {}", key, e)))?;

        Ok(row.and_then(|(value,)| value))
    }
}
