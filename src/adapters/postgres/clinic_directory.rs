//! PostgreSQL implementation of ClinicDirectory.
//!
//! Reads the platform-owned `clinics`, `profiles` and `clinic_members`
//! tables. Whole rows are also returned as JSON for payload enrichment.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{ClinicId, DomainError, Timestamp, UserId};
use crate::ports::{ClinicDirectory, ClinicRecord, ProfileRecord};

pub struct PostgresClinicDirectory {
    pool: PgPool,
}

impl PostgresClinicDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ClinicRow {
    id: Uuid,
    owner_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    details: Value,
}

impl From<ClinicRow> for ClinicRecord {
    fn from(row: ClinicRow) -> Self {
        ClinicRecord {
            id: ClinicId::from_uuid(row.id),
            owner_id: row.owner_id.map(UserId::from_uuid),
            created_at: Timestamp::from_datetime(row.created_at),
            details: row.details,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    full_name: Option<String>,
    cpf_cnpj: Option<String>,
    phone: Option<String>,
    details: Value,
}

impl From<ProfileRow> for ProfileRecord {
    fn from(row: ProfileRow) -> Self {
        ProfileRecord {
            id: UserId::from_uuid(row.id),
            full_name: row.full_name,
            document: row.cpf_cnpj,
            phone: row.phone,
            details: row.details,
        }
    }
}

#[async_trait]
impl ClinicDirectory for PostgresClinicDirectory {
    async fn find_clinic(&self, clinic_id: &ClinicId) -> Result<Option<ClinicRecord>, DomainError> {
        let row: Option<ClinicRow> = sqlx::query_as(
            r#"
            SELECT c.id, c.owner_id, c.created_at, to_jsonb(c) AS details
            FROM clinics c
            WHERE c.id = $1
            "#,
        )
        .bind(clinic_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch clinic: {}", e)))?;

        Ok(row.map(ClinicRecord::from))
    }

    async fn find_profile(&self, user_id: &UserId) -> Result<Option<ProfileRecord>, DomainError> {
        let row: Option<ProfileRow> = sqlx::query_as(
            r#"
            SELECT p.id, p.full_name, p.cpf_cnpj, p.phone, to_jsonb(p) AS details
            FROM profiles p
            WHERE p.id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch profile: {}", e)))?;

        Ok(row.map(ProfileRecord::from))
    }

    async fn is_member(&self, user_id: &UserId, clinic_id: &ClinicId) -> Result<bool, DomainError> {
        let (is_member,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM clinics WHERE id = $2 AND owner_id = $1
                UNION ALL
                SELECT 1 FROM clinic_members WHERE clinic_id = $2 AND user_id = $1
            )
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(clinic_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to check clinic membership: {}", e)))?;

        Ok(is_member)
    }
}
