//! HTTP DTOs (Data Transfer Objects) for subscription endpoints.
//!
//! These types define the JSON request/response structure for the billing API.
//! They serve as the boundary between HTTP and the application layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::application::{
    CreateSubscriptionResult, CurrentSubscription, HandleBillingWebhookResult, SubscriptionView,
};
use crate::domain::billing::{BillingError, SubscriptionStatus};
use crate::domain::foundation::{SubscriptionId, Timestamp};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to start a subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub clinic_id: String,
    pub plan_name: String,
    /// Amount per cycle, in reais.
    pub value: f64,
    /// `MONTHLY` or `YEARLY`.
    pub cycle: String,
    /// `BOLETO`, `CREDIT_CARD` or `PIX`.
    pub billing_type: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Query string of `GET /subscriptions`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetSubscriptionParams {
    pub clinic_id: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Envelope for successful creation.
#[derive(Debug, Clone, Serialize)]
pub struct CreateSubscriptionResponse {
    pub success: bool,
    pub data: CreatedSubscription,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedSubscription {
    pub subscription_id: SubscriptionId,
    pub asaas_subscription_id: Option<String>,
    pub status: SubscriptionStatus,
    pub payment_url: Option<String>,
    pub next_due_date: Option<NaiveDate>,
}

impl From<CreateSubscriptionResult> for CreateSubscriptionResponse {
    fn from(result: CreateSubscriptionResult) -> Self {
        let sub = result.subscription;
        Self {
            success: true,
            data: CreatedSubscription {
                subscription_id: sub.id,
                asaas_subscription_id: sub.asaas_subscription_id,
                status: sub.status,
                payment_url: result.payment_url,
                next_due_date: sub.next_due_date,
            },
        }
    }
}

/// Envelope for `GET /subscriptions`. `data` is null when the clinic has
/// neither a subscription nor an open trial.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResponse {
    pub data: Option<SubscriptionData>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SubscriptionData {
    Current(CurrentSubscription),
    Trial(TrialResponse),
}

/// Synthetic trial view.
#[derive(Debug, Clone, Serialize)]
pub struct TrialResponse {
    /// Always `TRIAL`.
    pub status: &'static str,
    pub trial_end_date: Timestamp,
    pub days_left: i64,
}

impl From<Option<SubscriptionView>> for SubscriptionResponse {
    fn from(view: Option<SubscriptionView>) -> Self {
        let data = view.map(|v| match v {
            SubscriptionView::Current(current) => SubscriptionData::Current(current),
            SubscriptionView::Trial(trial) => SubscriptionData::Trial(TrialResponse {
                status: "TRIAL",
                trial_end_date: trial.trial_end_date,
                days_left: trial.days_left,
            }),
        });
        Self { data }
    }
}

/// Acknowledgement returned to the billing provider.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookResponse {
    pub received: bool,
    /// `status_updated`, `acknowledged`, `already_applied` or `ignored`.
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SubscriptionStatus>,
}

impl From<HandleBillingWebhookResult> for WebhookResponse {
    fn from(result: HandleBillingWebhookResult) -> Self {
        let (outcome, subscription_id, status) = match result {
            HandleBillingWebhookResult::StatusUpdated {
                subscription_id,
                to,
                ..
            } => ("status_updated", Some(subscription_id), Some(to)),
            HandleBillingWebhookResult::Acknowledged {
                subscription_id,
                status,
            } => ("acknowledged", Some(subscription_id), Some(status)),
            HandleBillingWebhookResult::AlreadyApplied {
                subscription_id,
                status,
            } => ("already_applied", Some(subscription_id), Some(status)),
            HandleBillingWebhookResult::Ignored { .. } => ("ignored", None, None),
        };

        Self {
            received: true,
            outcome,
            subscription_id,
            status,
        }
    }
}

/// Error body. `error` carries the message, `code` a stable identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

impl From<&BillingError> for ErrorResponse {
    fn from(err: &BillingError) -> Self {
        Self::new(err.code(), err.message())
    }
}
