//! GetSubscriptionHandler - Query handler for a clinic's subscription view.
//!
//! Returns the current row reconciled against the provider's live state,
//! or a trial window when the clinic never subscribed. Provider calls are
//! best-effort; storage errors are not.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::domain::billing::{
    reconciliation, trial_status, BillingError, Subscription, SubscriptionStatus, TrialStatus,
};
use crate::domain::foundation::{AuthenticatedUser, ClinicId, Timestamp};
use crate::ports::{BillingProvider, ClinicDirectory, SubscriptionRepository};

/// Query for one clinic's subscription.
#[derive(Debug, Clone)]
pub struct GetSubscriptionQuery {
    pub user: AuthenticatedUser,
    pub clinic_id: String,
}

/// Stored subscription plus read-time provider data. The provider data is
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentSubscription {
    #[serde(flatten)]
    pub subscription: Subscription,
    pub asaas_data: Option<Value>,
    pub latest_payment: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionView {
    Current(CurrentSubscription),
    Trial(TrialStatus),
}

pub struct GetSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
    provider: Arc<dyn BillingProvider>,
    clinics: Arc<dyn ClinicDirectory>,
}

impl GetSubscriptionHandler {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        provider: Arc<dyn BillingProvider>,
        clinics: Arc<dyn ClinicDirectory>,
    ) -> Self {
        Self {
            repository,
            provider,
            clinics,
        }
    }

    /// `Ok(None)` when the clinic has neither a subscription nor an open
    /// trial.
    pub async fn handle(
        &self,
        query: GetSubscriptionQuery,
    ) -> Result<Option<SubscriptionView>, BillingError> {
        let clinic_id = ClinicId::parse(&query.clinic_id)?;

        if !self.clinics.is_member(&query.user.id, &clinic_id).await? {
            tracing::warn!(user_id = %query.user.id, clinic_id = %clinic_id, "Caller is not a clinic member");
            return Err(BillingError::forbidden("Access denied to this clinic"));
        }

        match self.repository.find_current_for_clinic(&clinic_id).await? {
            Some(subscription) => Ok(Some(SubscriptionView::Current(
                self.reconcile(subscription).await?,
            ))),
            None => self.trial(&clinic_id).await,
        }
    }

    async fn trial(&self, clinic_id: &ClinicId) -> Result<Option<SubscriptionView>, BillingError> {
        let Some(clinic) = self.clinics.find_clinic(clinic_id).await? else {
            tracing::debug!(clinic_id = %clinic_id, "Clinic not found, no trial");
            return Ok(None);
        };

        Ok(trial_status(clinic.created_at, Timestamp::now()).map(SubscriptionView::Trial))
    }

    async fn reconcile(
        &self,
        mut subscription: Subscription,
    ) -> Result<CurrentSubscription, BillingError> {
        let Some(provider_id) = subscription.asaas_subscription_id.clone() else {
            return Ok(CurrentSubscription {
                subscription,
                asaas_data: None,
                latest_payment: None,
            });
        };

        let live = match self.provider.get_subscription(&provider_id).await {
            Ok(live) => Some(live),
            Err(e) => {
                tracing::warn!(
                    provider_subscription_id = %provider_id,
                    error = %e,
                    "Live subscription fetch failed, serving stored state"
                );
                None
            }
        };

        let payment = match self.provider.latest_payment(&provider_id).await {
            Ok(payment) => payment,
            Err(e) => {
                tracing::warn!(
                    provider_subscription_id = %provider_id,
                    error = %e,
                    "Latest payment fetch failed"
                );
                None
            }
        };

        // Both sources fold into one target so the row is written at most once.
        let mut target = subscription.status;
        if let Some(live) = &live {
            if let Some(next) = reconciliation::live_status_target(target, &live.status) {
                target = next;
            }
        }
        if let Some(payment) = &payment {
            if reconciliation::should_demote_to_overdue(target, &payment.status) {
                target = SubscriptionStatus::Overdue;
            }
        }
        if target != subscription.status {
            self.apply_status(&mut subscription, target).await?;
        }

        if let Some(due) = live.as_ref().and_then(|live| live.next_due_date) {
            if subscription.next_due_date != Some(due) {
                self.repository
                    .update_next_due_date(&subscription.id, due)
                    .await?;
                subscription.next_due_date = Some(due);
            }
        }

        let asaas_data = live.map(|live| live.raw);
        let latest_payment = payment.map(|payment| payment.raw);

        Ok(CurrentSubscription {
            subscription,
            asaas_data,
            latest_payment,
        })
    }

    async fn apply_status(
        &self,
        subscription: &mut Subscription,
        target: SubscriptionStatus,
    ) -> Result<(), BillingError> {
        let changed = self
            .repository
            .update_status_if_changed(&subscription.id, target)
            .await?;

        if changed {
            tracing::info!(
                subscription_id = %subscription.id,
                from = %subscription.status,
                to = %target,
                "Subscription status reconciled on read"
            );
            subscription.updated_at = Timestamp::now();
        }
        subscription.status = target;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::asaas::MockBillingProvider;
    use crate::adapters::memory::{InMemoryClinicDirectory, InMemorySubscriptionRepository};
    use crate::domain::billing::{
        BillingCycle, BillingType, PlanTerms, PlanValue, ProviderPaymentStatus,
        ProviderSubscriptionStatus,
    };
    use crate::domain::foundation::UserId;
    use crate::ports::ProviderError;
    use chrono::NaiveDate;
    use uuid::Uuid;

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    struct Fixture {
        repo: InMemorySubscriptionRepository,
        provider: MockBillingProvider,
        clinics: InMemoryClinicDirectory,
        user: AuthenticatedUser,
        clinic_id: ClinicId,
    }

    impl Fixture {
        async fn created_days_ago(days: i64) -> Self {
            let clinics = InMemoryClinicDirectory::new();
            let user = AuthenticatedUser::new(UserId::from_uuid(Uuid::new_v4()), "a@b.test");
            let clinic_id = ClinicId::new();
            clinics
                .add_clinic(clinic_id, Some(user.id), Timestamp::now().add_days(-days))
                .await;

            Self {
                repo: InMemorySubscriptionRepository::new(),
                provider: MockBillingProvider::new(),
                clinics,
                user,
                clinic_id,
            }
        }

        fn handler(&self) -> GetSubscriptionHandler {
            GetSubscriptionHandler::new(
                Arc::new(self.repo.clone()),
                Arc::new(self.provider.clone()),
                Arc::new(self.clinics.clone()),
            )
        }

        fn query(&self) -> GetSubscriptionQuery {
            GetSubscriptionQuery {
                user: self.user.clone(),
                clinic_id: self.clinic_id.to_string(),
            }
        }

        async fn seed(&self, provider_id: &str, status: SubscriptionStatus) -> Subscription {
            let terms = PlanTerms {
                plan_name: "Pro".to_string(),
                value: PlanValue::from_cents(10000).unwrap(),
                cycle: BillingCycle::Monthly,
                billing_type: BillingType::CreditCard,
                description: None,
            };
            let mut sub = Subscription::pending(self.clinic_id, provider_id, &terms, None);
            sub.status = status;
            self.repo.seed(sub.clone()).await;
            sub
        }

        async fn current(&self) -> CurrentSubscription {
            match self.handler().handle(self.query()).await.unwrap() {
                Some(SubscriptionView::Current(current)) => current,
                other => panic!("expected current subscription, got {:?}", other),
            }
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Trial Window
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn trial_on_day_fourteen_has_one_day_left() {
        let fx = Fixture::created_days_ago(14).await;

        match fx.handler().handle(fx.query()).await.unwrap() {
            Some(SubscriptionView::Trial(trial)) => assert_eq!(trial.days_left, 1),
            other => panic!("expected trial, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn expired_trial_is_none() {
        let fx = Fixture::created_days_ago(16).await;
        assert_eq!(fx.handler().handle(fx.query()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn clinic_created_twenty_days_ago_without_row_is_none() {
        let fx = Fixture::created_days_ago(20).await;
        assert_eq!(fx.handler().handle(fx.query()).await.unwrap(), None);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Read-time Reconciliation
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn active_with_overdue_payment_is_demoted_and_persisted() {
        let fx = Fixture::created_days_ago(40).await;
        let sub = fx.seed("sub_1", SubscriptionStatus::Active).await;
        fx.provider.set_subscription("sub_1", ProviderSubscriptionStatus::Active);
        fx.provider.push_payment("sub_1", ProviderPaymentStatus::Overdue);

        let current = fx.current().await;

        assert_eq!(current.subscription.status, SubscriptionStatus::Overdue);
        assert_eq!(fx.repo.get(&sub.id).await.unwrap().status, SubscriptionStatus::Overdue);
        assert!(current.latest_payment.is_some());
        assert!(current.asaas_data.is_some());
    }

    #[tokio::test]
    async fn live_inactive_updates_active_row() {
        let fx = Fixture::created_days_ago(40).await;
        let sub = fx.seed("sub_1", SubscriptionStatus::Active).await;
        fx.provider.set_subscription("sub_1", ProviderSubscriptionStatus::Inactive);

        let current = fx.current().await;

        assert_eq!(current.subscription.status, SubscriptionStatus::Inactive);
        assert_eq!(fx.repo.get(&sub.id).await.unwrap().status, SubscriptionStatus::Inactive);
    }

    #[tokio::test]
    async fn pending_promoted_only_to_active() {
        let fx = Fixture::created_days_ago(40).await;
        let sub = fx.seed("sub_1", SubscriptionStatus::Pending).await;

        fx.provider.set_subscription("sub_1", ProviderSubscriptionStatus::Expired);
        assert_eq!(fx.current().await.subscription.status, SubscriptionStatus::Pending);
        assert_eq!(fx.repo.status_write_count(), 0);

        fx.provider.set_subscription("sub_1", ProviderSubscriptionStatus::Active);
        assert_eq!(fx.current().await.subscription.status, SubscriptionStatus::Active);
        assert_eq!(fx.repo.get(&sub.id).await.unwrap().status, SubscriptionStatus::Active);
    }

    #[tokio::test]
    async fn overdue_row_with_live_active_and_overdue_payment_is_left_alone() {
        let fx = Fixture::created_days_ago(40).await;
        let sub = fx.seed("sub_1", SubscriptionStatus::Overdue).await;
        fx.provider.set_subscription("sub_1", ProviderSubscriptionStatus::Active);
        fx.provider.push_payment("sub_1", ProviderPaymentStatus::Overdue);

        for _ in 0..2 {
            assert_eq!(fx.current().await.subscription.status, SubscriptionStatus::Overdue);
            assert_eq!(fx.repo.status_write_count(), 0);
        }
        assert_eq!(fx.repo.get(&sub.id).await.unwrap().status, SubscriptionStatus::Overdue);
    }

    #[tokio::test]
    async fn active_row_demoted_with_a_single_write() {
        let fx = Fixture::created_days_ago(40).await;
        fx.seed("sub_1", SubscriptionStatus::Active).await;
        fx.provider.set_subscription("sub_1", ProviderSubscriptionStatus::Active);
        fx.provider.push_payment("sub_1", ProviderPaymentStatus::Overdue);

        fx.current().await;
        fx.current().await;

        assert_eq!(fx.repo.status_write_count(), 1);
    }

    #[tokio::test]
    async fn canceled_row_stays_canceled_when_provider_reports_inactive() {
        let fx = Fixture::created_days_ago(40).await;
        let sub = fx.seed("sub_1", SubscriptionStatus::Canceled).await;
        fx.provider.set_subscription("sub_1", ProviderSubscriptionStatus::Inactive);

        assert_eq!(fx.current().await.subscription.status, SubscriptionStatus::Canceled);
        assert_eq!(fx.repo.get(&sub.id).await.unwrap().status, SubscriptionStatus::Canceled);
        assert_eq!(fx.repo.status_write_count(), 0);
    }

    #[tokio::test]
    async fn next_due_date_is_refreshed() {
        let fx = Fixture::created_days_ago(40).await;
        let sub = fx.seed("sub_1", SubscriptionStatus::Active).await;
        let due = NaiveDate::from_ymd_opt(2026, 12, 5).unwrap();
        fx.provider.set_subscription("sub_1", ProviderSubscriptionStatus::Active);
        fx.provider.set_next_due_date("sub_1", due);

        let current = fx.current().await;

        assert_eq!(current.subscription.next_due_date, Some(due));
        assert_eq!(fx.repo.get(&sub.id).await.unwrap().next_due_date, Some(due));
    }

    #[tokio::test]
    async fn provider_failure_serves_stored_row() {
        let fx = Fixture::created_days_ago(40).await;
        fx.seed("sub_1", SubscriptionStatus::Active).await;
        fx.provider
            .set_method_error("get_subscription", ProviderError::network("timeout"));
        fx.provider
            .set_method_error("latest_payment", ProviderError::api(503, "unavailable"));

        let current = fx.current().await;

        assert_eq!(current.subscription.status, SubscriptionStatus::Active);
        assert_eq!(current.asaas_data, None);
        assert_eq!(current.latest_payment, None);
        assert_eq!(fx.repo.status_write_count(), 0);
    }

    #[tokio::test]
    async fn row_without_provider_id_skips_provider() {
        let fx = Fixture::created_days_ago(40).await;
        let mut sub = fx.seed("sub_1", SubscriptionStatus::Pending).await;
        sub.asaas_subscription_id = None;
        let repo = InMemorySubscriptionRepository::new();
        repo.seed(sub).await;
        let handler = GetSubscriptionHandler::new(
            Arc::new(repo),
            Arc::new(fx.provider.clone()),
            Arc::new(fx.clinics.clone()),
        );

        let view = handler.handle(fx.query()).await.unwrap();

        assert!(matches!(view, Some(SubscriptionView::Current(_))));
        assert!(fx.provider.calls().is_empty());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Access Control
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn non_member_is_forbidden() {
        let fx = Fixture::created_days_ago(1).await;
        let query = GetSubscriptionQuery {
            user: AuthenticatedUser::new(UserId::from_uuid(Uuid::new_v4()), "x@y.test"),
            clinic_id: fx.clinic_id.to_string(),
        };

        let err = fx.handler().handle(query).await.unwrap_err();
        assert!(matches!(err, BillingError::Forbidden(_)));
    }

    #[tokio::test]
    async fn invalid_clinic_id_is_bad_request() {
        let fx = Fixture::created_days_ago(1).await;
        let query = GetSubscriptionQuery {
            user: fx.user.clone(),
            clinic_id: "not-a-uuid".to_string(),
        };

        let err = fx.handler().handle(query).await.unwrap_err();
        assert!(matches!(err, BillingError::BadRequest(_)));
    }
}
