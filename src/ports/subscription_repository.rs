//! Subscription repository port.
//!
//! Persists subscription rows. Rows are append-only history per clinic;
//! the current subscription is the most recently created row.
//!
//! # Design
//!
//! - **Conditional writes**: status updates are a single statement that
//!   only touches the row when the status actually differs, so concurrent
//!   deliveries of the same event collapse into one write.
//! - **No locking**: last writer wins for distinct target statuses.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::billing::{Subscription, SubscriptionStatus};
use crate::domain::foundation::{ClinicId, DomainError, SubscriptionId};

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert a new subscription row.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// Find the row carrying this provider subscription id.
    async fn find_by_provider_id(
        &self,
        provider_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Find the clinic's current (most recently created) row.
    async fn find_current_for_clinic(
        &self,
        clinic_id: &ClinicId,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Set the status unless the row already holds it.
    ///
    /// Returns `true` when a row changed. `false` means the row was already
    /// in `status` (or no longer exists); `updated_at` is untouched then.
    async fn update_status_if_changed(
        &self,
        id: &SubscriptionId,
        status: SubscriptionStatus,
    ) -> Result<bool, DomainError>;

    /// Refresh the next due date reported by the provider.
    async fn update_next_due_date(
        &self,
        id: &SubscriptionId,
        next_due_date: NaiveDate,
    ) -> Result<(), DomainError>;
}
