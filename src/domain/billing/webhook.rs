//! Inbound webhook payload from the billing provider.
//!
//! Only the fields used for routing are typed. The rest of each object is
//! kept so the payment can be forwarded verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of a provider webhook delivery.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub event: Option<String>,

    #[serde(default)]
    pub payment: Option<WebhookPayment>,

    #[serde(default)]
    pub subscription: Option<WebhookSubscription>,
}

/// Payment object carried by `PAYMENT_*` events.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WebhookPayment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Provider subscription this payment belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<String>,

    #[serde(
        rename = "externalReference",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub external_reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Subscription object carried by `SUBSCRIPTION_*` events.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WebhookSubscription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(
        rename = "externalReference",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub external_reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WebhookPayload {
    /// Event name, if present and non-blank.
    pub fn event_name(&self) -> Option<&str> {
        self.event.as_deref().map(str::trim).filter(|e| !e.is_empty())
    }

    /// Provider subscription id: `payment.subscription`, then `subscription.id`.
    pub fn provider_subscription_id(&self) -> Option<&str> {
        self.payment
            .as_ref()
            .and_then(|p| non_blank(p.subscription.as_deref()))
            .or_else(|| {
                self.subscription
                    .as_ref()
                    .and_then(|s| non_blank(s.id.as_deref()))
            })
    }

    /// External reference: payment first, then subscription.
    pub fn external_reference(&self) -> Option<&str> {
        self.payment
            .as_ref()
            .and_then(|p| non_blank(p.external_reference.as_deref()))
            .or_else(|| {
                self.subscription
                    .as_ref()
                    .and_then(|s| non_blank(s.external_reference.as_deref()))
            })
    }

    /// Raw payment object for forwarding.
    pub fn payment_json(&self) -> Option<Value> {
        self.payment
            .as_ref()
            .and_then(|p| serde_json::to_value(p).ok())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
