//! AutomationForwarder - best-effort forwarding of billing events.
//!
//! Builds an enriched payload (subscription, clinic, owner profile, raw
//! payment) and POSTs it to the automation endpoint. Every attempt is
//! recorded in the notification log. Nothing here can fail the caller.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::domain::billing::{ProviderEvent, Subscription};
use crate::domain::foundation::Timestamp;
use crate::ports::{
    AutomationNotifier, ClinicDirectory, NotificationLog, NotificationLogEntry, SettingsReader,
};

/// Default `system_settings` key holding the endpoint URL.
pub const DEFAULT_SETTINGS_KEY: &str = "automation_webhook_url";

/// What happened to a forwarding attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    Delivered { url: String, status: u16 },
    Failed { url: String, error: String },
    /// No endpoint configured.
    Skipped,
}

pub struct AutomationForwarder {
    settings: Arc<dyn SettingsReader>,
    clinics: Arc<dyn ClinicDirectory>,
    notifier: Arc<dyn AutomationNotifier>,
    log: Arc<dyn NotificationLog>,
    settings_key: String,
    fallback_url: Option<String>,
}

impl AutomationForwarder {
    pub fn new(
        settings: Arc<dyn SettingsReader>,
        clinics: Arc<dyn ClinicDirectory>,
        notifier: Arc<dyn AutomationNotifier>,
        log: Arc<dyn NotificationLog>,
    ) -> Self {
        Self {
            settings,
            clinics,
            notifier,
            log,
            settings_key: DEFAULT_SETTINGS_KEY.to_string(),
            fallback_url: None,
        }
    }

    pub fn with_settings_key(mut self, key: impl Into<String>) -> Self {
        self.settings_key = key.into();
        self
    }

    /// URL used when the settings table has none.
    pub fn with_fallback_url(mut self, url: Option<String>) -> Self {
        self.fallback_url = url.filter(|u| !u.trim().is_empty());
        self
    }

    pub async fn forward(
        &self,
        event: &ProviderEvent,
        subscription: &Subscription,
        payment: Option<Value>,
    ) -> ForwardOutcome {
        let Some(url) = self.endpoint_url().await else {
            tracing::debug!(event = %event, "No automation endpoint configured, skipping");
            return ForwardOutcome::Skipped;
        };

        let payload = self.build_payload(event, subscription, payment).await;

        let (outcome, response_status, error) = match self.notifier.deliver(&url, &payload).await {
            Ok(receipt) => {
                tracing::info!(
                    event = %event,
                    subscription_id = %subscription.id,
                    status = receipt.status,
                    "Automation notification delivered"
                );
                (
                    ForwardOutcome::Delivered {
                        url: url.clone(),
                        status: receipt.status,
                    },
                    Some(receipt.status),
                    None,
                )
            }
            Err(e) => {
                tracing::warn!(
                    event = %event,
                    subscription_id = %subscription.id,
                    error = %e,
                    "Automation notification failed"
                );
                (
                    ForwardOutcome::Failed {
                        url: url.clone(),
                        error: e.message.clone(),
                    },
                    e.status,
                    Some(e.message),
                )
            }
        };

        let entry = NotificationLogEntry {
            subscription_id: subscription.id,
            event: event.as_str().to_string(),
            success: error.is_none(),
            url,
            payload,
            response_status,
            error,
            created_at: Timestamp::now(),
        };

        if let Err(e) = self.log.record(&entry).await {
            tracing::warn!(error = %e, subscription_id = %subscription.id, "Failed to write notification log");
        }

        outcome
    }

    async fn endpoint_url(&self) -> Option<String> {
        match self.settings.get(&self.settings_key).await {
            Ok(Some(url)) if !url.trim().is_empty() => return Some(url.trim().to_string()),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, key = %self.settings_key, "Failed to read automation endpoint setting");
            }
        }
        self.fallback_url.clone()
    }

    async fn build_payload(
        &self,
        event: &ProviderEvent,
        subscription: &Subscription,
        payment: Option<Value>,
    ) -> Value {
        let clinic = match self.clinics.find_clinic(&subscription.clinic_id).await {
            Ok(clinic) => clinic,
            Err(e) => {
                tracing::warn!(error = %e, clinic_id = %subscription.clinic_id, "Clinic lookup failed");
                None
            }
        };

        let owner = match clinic.as_ref().and_then(|c| c.owner_id) {
            Some(owner_id) => match self.clinics.find_profile(&owner_id).await {
                Ok(profile) => profile.map(|p| p.details),
                Err(e) => {
                    tracing::warn!(error = %e, owner_id = %owner_id, "Owner profile lookup failed");
                    None
                }
            },
            None => None,
        };

        json!({
            "event": event.as_str(),
            "sent_at": Timestamp::now(),
            "subscription": subscription,
            "clinic": clinic.map(|c| c.details),
            "owner": owner,
            "payment": payment,
        })
    }
}
