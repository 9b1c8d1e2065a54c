//! Subscription aggregate.

use chrono::NaiveDate;
use serde::Serialize;

use super::{BillingCycle, BillingType, PlanValue, SubscriptionStatus};
use crate::domain::foundation::{ClinicId, SubscriptionId, Timestamp};

/// One subscription attempt for a clinic.
///
/// Rows are append-only history; the most recently created row for a
/// clinic is its current subscription.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub clinic_id: ClinicId,
    /// Provider-side id, absent until the provider accepted the request.
    pub asaas_subscription_id: Option<String>,
    pub status: SubscriptionStatus,
    pub plan_name: String,
    pub value: PlanValue,
    pub cycle: BillingCycle,
    pub billing_type: BillingType,
    pub next_due_date: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Terms requested by the caller when starting a subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanTerms {
    pub plan_name: String,
    pub value: PlanValue,
    pub cycle: BillingCycle,
    pub billing_type: BillingType,
    pub description: Option<String>,
}

impl Subscription {
    /// A freshly originated subscription. Always `PENDING`, whatever the
    /// provider reported.
    pub fn pending(
        clinic_id: ClinicId,
        asaas_subscription_id: impl Into<String>,
        terms: &PlanTerms,
        next_due_date: Option<NaiveDate>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: SubscriptionId::new(),
            clinic_id,
            asaas_subscription_id: Some(asaas_subscription_id.into()),
            status: SubscriptionStatus::Pending,
            plan_name: terms.plan_name.clone(),
            value: terms.value,
            cycle: terms.cycle,
            billing_type: terms.billing_type,
            next_due_date,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms() -> PlanTerms {
        PlanTerms {
            plan_name: "Pro".to_string(),
            value: PlanValue::from_cents(19990).unwrap(),
            cycle: BillingCycle::Monthly,
            billing_type: BillingType::Pix,
            description: None,
        }
    }

    #[test]
    fn pending_starts_in_pending() {
        let clinic = ClinicId::new();
        let sub = Subscription::pending(clinic, "sub_1", &terms(), None);

        assert_eq!(sub.status, SubscriptionStatus::Pending);
        assert_eq!(sub.clinic_id, clinic);
        assert_eq!(sub.asaas_subscription_id.as_deref(), Some("sub_1"));
        assert_eq!(sub.created_at, sub.updated_at);
    }

    #[test]
    fn serializes_with_decimal_value() {
        let sub = Subscription::pending(ClinicId::new(), "sub_1", &terms(), None);
        let json = serde_json::to_value(&sub).unwrap();

        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["value"], 199.9);
        assert_eq!(json["cycle"], "MONTHLY");
    }
}
