//! In-memory subscription repository.
//!
//! Useful for testing and development.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::domain::billing::{Subscription, SubscriptionStatus};
use crate::domain::foundation::{ClinicId, DomainError, SubscriptionId, Timestamp};
use crate::ports::SubscriptionRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemorySubscriptionRepository {
    rows: Arc<RwLock<Vec<Subscription>>>,
    status_writes: Arc<AtomicUsize>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row directly, bypassing the port.
    pub async fn seed(&self, subscription: Subscription) {
        self.rows.write().await.push(subscription);
    }

    pub async fn get(&self, id: &SubscriptionId) -> Option<Subscription> {
        self.rows.read().await.iter().find(|s| &s.id == id).cloned()
    }

    pub async fn all(&self) -> Vec<Subscription> {
        self.rows.read().await.clone()
    }

    /// Number of status writes that actually changed a row.
    pub fn status_write_count(&self) -> usize {
        self.status_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn insert(&self, subscription: &Subscription) -> Result<(), DomainError> {
        self.rows.write().await.push(subscription.clone());
        Ok(())
    }

    async fn find_by_provider_id(
        &self,
        provider_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|s| s.asaas_subscription_id.as_deref() == Some(provider_subscription_id))
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn find_current_for_clinic(
        &self,
        clinic_id: &ClinicId,
    ) -> Result<Option<Subscription>, DomainError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|s| &s.clinic_id == clinic_id)
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn update_status_if_changed(
        &self,
        id: &SubscriptionId,
        status: SubscriptionStatus,
    ) -> Result<bool, DomainError> {
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|s| &s.id == id) {
            Some(row) if row.status != status => {
                row.status = status;
                row.updated_at = Timestamp::now();
                self.status_writes.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_next_due_date(
        &self,
        id: &SubscriptionId,
        next_due_date: NaiveDate,
    ) -> Result<(), DomainError> {
        let mut rows = self.rows.write().await;
        if let Some(row) = rows.iter_mut().find(|s| &s.id == id) {
            row.next_due_date = Some(next_due_date);
            row.updated_at = Timestamp::now();
        }
        Ok(())
    }
}
