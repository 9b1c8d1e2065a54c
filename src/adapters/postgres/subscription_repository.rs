//! PostgreSQL implementation of SubscriptionRepository.
//!
//! Rows are append-only history in `subscriptions`; the most recently
//! created row per clinic is the current one.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::{BillingCycle, BillingType, PlanValue, Subscription, SubscriptionStatus};
use crate::domain::foundation::{ClinicId, DomainError, ErrorCode, SubscriptionId, Timestamp};
use crate::ports::SubscriptionRepository;

const SELECT_COLUMNS: &str = r#"
    SELECT id, clinic_id, asaas_subscription_id, status, plan_name,
           value::float8 AS value, cycle, billing_type, next_due_date,
           created_at, updated_at
    FROM subscriptions
"#;

/// PostgreSQL implementation of the SubscriptionRepository port.
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a subscription.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    clinic_id: Uuid,
    asaas_subscription_id: Option<String>,
    status: String,
    plan_name: String,
    value: f64,
    cycle: String,
    billing_type: String,
    next_due_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            clinic_id: ClinicId::from_uuid(row.clinic_id),
            asaas_subscription_id: row.asaas_subscription_id,
            status: parse_column::<SubscriptionStatus>("status", &row.status)?,
            plan_name: row.plan_name,
            value: PlanValue::from_decimal(row.value).map_err(corrupt("value"))?,
            cycle: parse_column::<BillingCycle>("cycle", &row.cycle)?,
            billing_type: parse_column::<BillingType>("billing_type", &row.billing_type)?,
            next_due_date: row.next_due_date,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

/// Parses a stored enum column. Status parsing is case-insensitive, so
/// legacy lowercase rows still load.
fn parse_column<T>(column: &str, raw: &str) -> Result<T, DomainError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(corrupt(column))
}

fn corrupt<E: std::fmt::Display>(column: &str) -> impl FnOnce(E) -> DomainError + '_ {
    move |e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid {} value: {}", column, e),
        )
    }
}

fn db_error(action: &str) -> impl FnOnce(sqlx::Error) -> DomainError + '_ {
    move |e| DomainError::database(format!("Failed to {}: {}", action, e))
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn insert(&self, subscription: &Subscription) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, clinic_id, asaas_subscription_id, status, plan_name, value,
                cycle, billing_type, next_due_date, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.clinic_id.as_uuid())
        .bind(&subscription.asaas_subscription_id)
        .bind(subscription.status.as_str())
        .bind(&subscription.plan_name)
        .bind(subscription.value.as_decimal())
        .bind(subscription.cycle.as_str())
        .bind(subscription.billing_type.as_str())
        .bind(subscription.next_due_date)
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("insert subscription"))?;

        Ok(())
    }

    async fn find_by_provider_id(
        &self,
        provider_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        let sql = format!(
            "{} WHERE asaas_subscription_id = $1 ORDER BY created_at DESC LIMIT 1",
            SELECT_COLUMNS
        );
        let row: Option<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(provider_subscription_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("fetch subscription"))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_current_for_clinic(
        &self,
        clinic_id: &ClinicId,
    ) -> Result<Option<Subscription>, DomainError> {
        let sql = format!(
            "{} WHERE clinic_id = $1 ORDER BY created_at DESC LIMIT 1",
            SELECT_COLUMNS
        );
        let row: Option<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(clinic_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("fetch current subscription"))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn update_status_if_changed(
        &self,
        id: &SubscriptionId,
        status: SubscriptionStatus,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND UPPER(status) IS DISTINCT FROM $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(status.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error("update subscription status"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_next_due_date(
        &self,
        id: &SubscriptionId,
        next_due_date: NaiveDate,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE subscriptions
            SET next_due_date = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(next_due_date)
        .execute(&self.pool)
        .await
        .map_err(db_error("update next due date"))?;

        Ok(())
    }
}
