//! Mock billing provider for testing.
//!
//! Configurable in-memory implementation of `BillingProvider` used by unit
//! and integration tests. Supports:
//! - Seeded customers, subscriptions and payments
//! - Error injection per method
//! - Call tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use crate::domain::billing::{ProviderPaymentStatus, ProviderSubscriptionStatus};
use crate::ports::{
    BillingProvider, NewCustomer, NewSubscription, ProviderCustomer, ProviderError,
    ProviderPayment, ProviderSubscription,
};

/// Mock billing provider.
///
/// Clones share state, so a test can keep a handle after moving one into
/// an `Arc<dyn BillingProvider>`.
#[derive(Default, Clone)]
pub struct MockBillingProvider {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Customers keyed by e-mail.
    customers: HashMap<String, ProviderCustomer>,

    subscriptions: HashMap<String, ProviderSubscription>,

    /// Charges per subscription, oldest first.
    payments: HashMap<String, Vec<ProviderPayment>>,

    /// Status reported by newly created subscriptions.
    created_status: Option<ProviderSubscriptionStatus>,

    /// When false, creating a subscription does not generate a first charge.
    skip_first_payment: bool,

    method_errors: HashMap<String, ProviderError>,

    call_log: Vec<MethodCall>,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

impl MockBillingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Add an existing customer.
    pub fn add_customer(&self, email: &str, customer_id: &str) {
        self.state().customers.insert(
            email.to_string(),
            ProviderCustomer {
                id: customer_id.to_string(),
                name: None,
                email: Some(email.to_string()),
            },
        );
    }

    /// Add or replace a live subscription.
    pub fn set_subscription(&self, id: &str, status: ProviderSubscriptionStatus) {
        self.state().subscriptions.insert(
            id.to_string(),
            ProviderSubscription {
                id: id.to_string(),
                raw: json!({"id": id, "status": status.as_str()}),
                status,
                next_due_date: None,
            },
        );
    }

    /// Set the next due date reported for a subscription.
    pub fn set_next_due_date(&self, id: &str, date: chrono::NaiveDate) {
        if let Some(sub) = self.state().subscriptions.get_mut(id) {
            sub.next_due_date = Some(date);
            sub.raw["nextDueDate"] = json!(date.to_string());
        }
    }

    /// Append a charge to a subscription; it becomes the latest one.
    pub fn push_payment(&self, subscription_id: &str, status: ProviderPaymentStatus) {
        let id = format!("pay_{}", short_id());
        let payment = ProviderPayment {
            raw: json!({"id": id, "status": status.as_str(), "subscription": subscription_id}),
            id,
            status,
            due_date: None,
            invoice_url: None,
        };
        self.state()
            .payments
            .entry(subscription_id.to_string())
            .or_default()
            .push(payment);
    }

    /// Status newly created subscriptions report. Defaults to ACTIVE.
    pub fn set_created_status(&self, status: ProviderSubscriptionStatus) {
        self.state().created_status = Some(status);
    }

    /// Do not generate a first charge on subscription creation.
    pub fn without_first_payment(&self) {
        self.state().skip_first_payment = true;
    }

    /// Fail every call to `method` with `error`.
    pub fn set_method_error(&self, method: &str, error: ProviderError) {
        self.state()
            .method_errors
            .insert(method.to_string(), error);
    }

    pub fn clear_errors(&self) {
        self.state().method_errors.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<MethodCall> {
        self.state().call_log.clone()
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.state().call_log.iter().any(|c| c.method == method)
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.state()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Internal Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.state().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self, method: &str) -> Result<(), ProviderError> {
        match self.state().method_errors.get(method) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[async_trait]
impl BillingProvider for MockBillingProvider {
    async fn find_customer_by_email(
        &self,
        email: &str,
    ) -> Result<Option<ProviderCustomer>, ProviderError> {
        self.record_call("find_customer_by_email", vec![email.to_string()]);
        self.check_error("find_customer_by_email")?;

        Ok(self.state().customers.get(email).cloned())
    }

    async fn create_customer(
        &self,
        request: NewCustomer,
    ) -> Result<ProviderCustomer, ProviderError> {
        self.record_call(
            "create_customer",
            vec![request.email.clone(), request.external_reference.clone()],
        );
        self.check_error("create_customer")?;

        let customer = ProviderCustomer {
            id: format!("cus_{}", short_id()),
            name: Some(request.name),
            email: Some(request.email.clone()),
        };
        self.state()
            .customers
            .insert(request.email, customer.clone());
        Ok(customer)
    }

    async fn create_subscription(
        &self,
        request: NewSubscription,
    ) -> Result<ProviderSubscription, ProviderError> {
        self.record_call(
            "create_subscription",
            vec![
                request.customer_id.clone(),
                request.external_reference.clone(),
                request.next_due_date.to_string(),
            ],
        );
        self.check_error("create_subscription")?;

        let mut state = self.state();
        let id = format!("sub_{}", short_id());
        let status = state
            .created_status
            .clone()
            .unwrap_or(ProviderSubscriptionStatus::Active);

        let subscription = ProviderSubscription {
            raw: json!({
                "id": id,
                "customer": request.customer_id,
                "status": status.as_str(),
                "value": request.value.as_decimal(),
                "cycle": request.cycle.as_str(),
                "billingType": request.billing_type.as_str(),
                "nextDueDate": request.next_due_date.to_string(),
                "externalReference": request.external_reference,
            }),
            id: id.clone(),
            status,
            next_due_date: Some(request.next_due_date),
        };
        state.subscriptions.insert(id.clone(), subscription.clone());

        if !state.skip_first_payment {
            let payment_id = format!("pay_{}", short_id());
            let invoice_url = format!("https://sandbox.asaas.test/i/{}", payment_id);
            let payment = ProviderPayment {
                raw: json!({"id": payment_id, "status": "PENDING", "invoiceUrl": invoice_url}),
                id: payment_id,
                status: ProviderPaymentStatus::Pending,
                due_date: Some(request.next_due_date),
                invoice_url: Some(invoice_url),
            };
            state.payments.entry(id).or_default().push(payment);
        }

        Ok(subscription)
    }

    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<ProviderSubscription, ProviderError> {
        self.record_call("get_subscription", vec![subscription_id.to_string()]);
        self.check_error("get_subscription")?;

        self.state()
            .subscriptions
            .get(subscription_id)
            .cloned()
            .ok_or_else(|| ProviderError::not_found("Subscription").with_status(404))
    }

    async fn latest_payment(
        &self,
        subscription_id: &str,
    ) -> Result<Option<ProviderPayment>, ProviderError> {
        self.record_call("latest_payment", vec![subscription_id.to_string()]);
        self.check_error("latest_payment")?;

        Ok(self
            .state()
            .payments
            .get(subscription_id)
            .and_then(|p| p.last().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::{BillingCycle, BillingType, PlanValue};
    use chrono::NaiveDate;

    fn new_subscription() -> NewSubscription {
        NewSubscription {
            customer_id: "cus_1".to_string(),
            billing_type: BillingType::Pix,
            cycle: BillingCycle::Monthly,
            value: PlanValue::from_cents(9900).unwrap(),
            next_due_date: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
            description: None,
            external_reference: "ref".to_string(),
        }
    }

    #[tokio::test]
    async fn created_subscription_has_first_payment() {
        let mock = MockBillingProvider::new();
        let sub = mock.create_subscription(new_subscription()).await.unwrap();

        assert_eq!(sub.status, ProviderSubscriptionStatus::Active);
        let payment = mock.latest_payment(&sub.id).await.unwrap().unwrap();
        assert!(payment.invoice_url.is_some());
    }

    #[tokio::test]
    async fn method_error_is_returned() {
        let mock = MockBillingProvider::new();
        mock.set_method_error("get_subscription", ProviderError::network("timeout"));

        let err = mock.get_subscription("sub_1").await.unwrap_err();
        assert_eq!(err.message, "timeout");
        assert_eq!(mock.call_count("get_subscription"), 1);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let mock = MockBillingProvider::new();
        let handle = mock.clone();
        mock.add_customer("a@b.test", "cus_9");

        let found = handle.find_customer_by_email("a@b.test").await.unwrap();
        assert_eq!(found.map(|c| c.id), Some("cus_9".to_string()));
    }

    #[tokio::test]
    async fn latest_payment_is_last_pushed() {
        let mock = MockBillingProvider::new();
        mock.push_payment("sub_1", ProviderPaymentStatus::Confirmed);
        mock.push_payment("sub_1", ProviderPaymentStatus::Overdue);

        let latest = mock.latest_payment("sub_1").await.unwrap().unwrap();
        assert!(latest.status.is_overdue());
    }
}
