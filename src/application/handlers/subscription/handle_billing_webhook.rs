//! HandleBillingWebhookHandler - Command handler for billing provider webhooks.
//!
//! Resolves the subscription row an event refers to, applies the mapped
//! status with a conditional write, and forwards allow-listed events to the
//! automation endpoint. Notification never affects the outcome.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use crate::domain::billing::{
    reconciliation, BillingError, ExternalReference, ProviderEvent, StatusMapping, Subscription,
    SubscriptionStatus, WebhookPayload,
};
use crate::ports::SubscriptionRepository;

use super::AutomationForwarder;

/// Command to handle one webhook delivery.
#[derive(Debug, Clone)]
pub struct HandleBillingWebhookCommand {
    /// Raw request body.
    pub payload: Vec<u8>,
    /// Value of the `asaas-access-token` header, if sent.
    pub access_token: Option<String>,
}

/// Result of webhook processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleBillingWebhookResult {
    /// The row moved to a new status.
    StatusUpdated {
        subscription_id: String,
        from: SubscriptionStatus,
        to: SubscriptionStatus,
    },
    /// Event processed, status left as is.
    Acknowledged {
        subscription_id: String,
        status: SubscriptionStatus,
    },
    /// Row already held the target status. Nothing written or forwarded.
    AlreadyApplied {
        subscription_id: String,
        status: SubscriptionStatus,
    },
    /// Unrecognised event name.
    Ignored { event: String },
}

pub struct HandleBillingWebhookHandler {
    repository: Arc<dyn SubscriptionRepository>,
    forwarder: Arc<AutomationForwarder>,
    webhook_token: Option<SecretString>,
}

impl HandleBillingWebhookHandler {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        forwarder: Arc<AutomationForwarder>,
    ) -> Self {
        Self {
            repository,
            forwarder,
            webhook_token: None,
        }
    }

    /// Require deliveries to carry this shared token.
    pub fn with_webhook_token(mut self, token: Option<SecretString>) -> Self {
        self.webhook_token = token;
        self
    }

    pub async fn handle(
        &self,
        cmd: HandleBillingWebhookCommand,
    ) -> Result<HandleBillingWebhookResult, BillingError> {
        // 1. Authenticate the delivery
        self.verify_token(cmd.access_token.as_deref())?;

        // 2. Parse and classify
        let payload: WebhookPayload = serde_json::from_slice(&cmd.payload).map_err(|e| {
            tracing::warn!(error = %e, "Invalid webhook payload");
            BillingError::bad_request(format!("Invalid JSON payload: {}", e))
        })?;

        let event_name = payload
            .event_name()
            .ok_or_else(|| BillingError::bad_request("Missing event"))?;
        let event = ProviderEvent::parse(event_name);

        if !event.is_known() {
            tracing::info!(event = %event, "Ignoring unrecognised billing event");
            return Ok(HandleBillingWebhookResult::Ignored {
                event: event_name.to_string(),
            });
        }

        // 3. Locate the subscription row
        let mut subscription = self.locate(&payload).await?;
        let current = subscription.status;
        let subscription_id = subscription.id.to_string();

        tracing::info!(
            event = %event,
            subscription_id = %subscription.id,
            clinic_id = %subscription.clinic_id,
            status = %current,
            "Processing billing event"
        );

        // 4. Apply the status change
        let result = match event.mapping() {
            StatusMapping::Apply(target) if target == current => {
                tracing::debug!(subscription_id = %subscription.id, status = %current, "Status already applied");
                return Ok(HandleBillingWebhookResult::AlreadyApplied {
                    subscription_id,
                    status: current,
                });
            }
            StatusMapping::Apply(_) => match reconciliation::webhook_target(current, &event) {
                Some(target) => {
                    let changed = self
                        .repository
                        .update_status_if_changed(&subscription.id, target)
                        .await?;

                    if !changed {
                        // A concurrent delivery got there first.
                        return Ok(HandleBillingWebhookResult::AlreadyApplied {
                            subscription_id,
                            status: target,
                        });
                    }

                    tracing::info!(
                        subscription_id = %subscription.id,
                        from = %current,
                        to = %target,
                        "Subscription status updated"
                    );
                    subscription.status = target;
                    HandleBillingWebhookResult::StatusUpdated {
                        subscription_id,
                        from: current,
                        to: target,
                    }
                }
                None => {
                    tracing::info!(
                        event = %event,
                        subscription_id = %subscription.id,
                        "Event not trusted to promote pending subscription"
                    );
                    HandleBillingWebhookResult::Acknowledged {
                        subscription_id,
                        status: current,
                    }
                }
            },
            StatusMapping::Unchanged | StatusMapping::Ignore => {
                HandleBillingWebhookResult::Acknowledged {
                    subscription_id,
                    status: current,
                }
            }
        };

        // 5. Forward downstream, after the write
        if event.is_forwarded() {
            self.forwarder
                .forward(&event, &subscription, payload.payment_json())
                .await;
        }

        Ok(result)
    }

    fn verify_token(&self, provided: Option<&str>) -> Result<(), BillingError> {
        let Some(expected) = &self.webhook_token else {
            return Ok(());
        };

        let provided = provided.unwrap_or_default();
        if expected
            .expose_secret()
            .as_bytes()
            .ct_eq(provided.as_bytes())
            .unwrap_u8()
            != 1
        {
            tracing::warn!("Webhook rejected: invalid access token");
            return Err(BillingError::unauthenticated("Invalid webhook token"));
        }
        Ok(())
    }

    /// Provider subscription id first, then the clinic's current row via
    /// the external reference.
    async fn locate(&self, payload: &WebhookPayload) -> Result<Subscription, BillingError> {
        let provider_id = payload.provider_subscription_id();
        let external_reference = payload.external_reference();

        if provider_id.is_none() && external_reference.is_none() {
            return Err(BillingError::bad_request(
                "Payload has no subscription id or externalReference",
            ));
        }

        if let Some(provider_id) = provider_id {
            if let Some(found) = self.repository.find_by_provider_id(provider_id).await? {
                return Ok(found);
            }
        }

        if let Some(raw) = external_reference {
            match ExternalReference::parse(raw) {
                Ok(reference) => {
                    if let Some(found) = self
                        .repository
                        .find_current_for_clinic(&reference.clinic_id())
                        .await?
                    {
                        return Ok(found);
                    }
                }
                Err(e) if provider_id.is_none() => {
                    return Err(BillingError::bad_request(e.to_string()));
                }
                Err(e) => {
                    tracing::warn!(error = %e, external_reference = raw, "Unparseable externalReference");
                }
            }
        }

        tracing::warn!(
            provider_subscription_id = provider_id.unwrap_or_default(),
            external_reference = external_reference.unwrap_or_default(),
            "No subscription matches webhook"
        );
        Err(BillingError::not_found("Subscription not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryClinicDirectory, InMemoryNotificationLog, InMemorySettings,
        InMemorySubscriptionRepository,
    };
    use crate::adapters::notifier::RecordingNotifier;
    use crate::application::handlers::subscription::DEFAULT_SETTINGS_KEY;
    use crate::domain::billing::{BillingCycle, BillingType, PlanTerms, PlanValue};
    use crate::domain::foundation::ClinicId;
    use crate::ports::DeliveryError;
    use serde_json::json;

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    struct Fixture {
        repo: InMemorySubscriptionRepository,
        notifier: RecordingNotifier,
        log: InMemoryNotificationLog,
        handler: HandleBillingWebhookHandler,
    }

    async fn fixture() -> Fixture {
        let repo = InMemorySubscriptionRepository::new();
        let notifier = RecordingNotifier::new();
        let log = InMemoryNotificationLog::new();
        let settings = InMemorySettings::new();
        settings.set(DEFAULT_SETTINGS_KEY, "https://hooks.test/billing").await;

        let forwarder = AutomationForwarder::new(
            Arc::new(settings),
            Arc::new(InMemoryClinicDirectory::new()),
            Arc::new(notifier.clone()),
            Arc::new(log.clone()),
        );
        let handler = HandleBillingWebhookHandler::new(Arc::new(repo.clone()), Arc::new(forwarder));

        Fixture {
            repo,
            notifier,
            log,
            handler,
        }
    }

    fn stored(clinic: ClinicId, provider_id: &str, status: SubscriptionStatus) -> Subscription {
        let terms = PlanTerms {
            plan_name: "Pro".to_string(),
            value: PlanValue::from_cents(10000).unwrap(),
            cycle: BillingCycle::Monthly,
            billing_type: BillingType::Boleto,
            description: None,
        };
        let mut sub = Subscription::pending(clinic, provider_id, &terms, None);
        sub.status = status;
        sub
    }

    fn command(body: serde_json::Value) -> HandleBillingWebhookCommand {
        HandleBillingWebhookCommand {
            payload: serde_json::to_vec(&body).unwrap(),
            access_token: None,
        }
    }

    fn confirmed(provider_id: &str) -> HandleBillingWebhookCommand {
        command(json!({
            "event": "PAYMENT_CONFIRMED",
            "payment": {"id": "pay_1", "subscription": provider_id, "status": "CONFIRMED", "value": 100}
        }))
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Status Transitions
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn payment_confirmed_activates_pending_and_forwards() {
        let fx = fixture().await;
        let sub = stored(ClinicId::new(), "sub_123", SubscriptionStatus::Pending);
        let id = sub.id;
        fx.repo.seed(sub).await;

        let result = fx.handler.handle(confirmed("sub_123")).await.unwrap();

        assert!(matches!(
            result,
            HandleBillingWebhookResult::StatusUpdated {
                from: SubscriptionStatus::Pending,
                to: SubscriptionStatus::Active,
                ..
            }
        ));
        assert_eq!(fx.repo.get(&id).await.unwrap().status, SubscriptionStatus::Active);

        let deliveries = fx.notifier.deliveries().await;
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].payload["event"], "PAYMENT_CONFIRMED");
        assert_eq!(deliveries[0].payload["subscription"]["status"], "ACTIVE");
        assert_eq!(deliveries[0].payload["payment"]["id"], "pay_1");
        assert_eq!(fx.log.entries().await.len(), 1);
    }

    #[tokio::test]
    async fn failed_notification_keeps_status_update() {
        let fx = fixture().await;
        fx.notifier
            .fail_with(DeliveryError::rejected(500, "boom"))
            .await;
        let sub = stored(ClinicId::new(), "sub_123", SubscriptionStatus::Pending);
        let id = sub.id;
        fx.repo.seed(sub).await;

        let result = fx.handler.handle(confirmed("sub_123")).await.unwrap();

        assert!(matches!(
            result,
            HandleBillingWebhookResult::StatusUpdated {
                to: SubscriptionStatus::Active,
                ..
            }
        ));
        assert_eq!(fx.repo.get(&id).await.unwrap().status, SubscriptionStatus::Active);
        assert_eq!(fx.notifier.deliveries().await.len(), 1);

        let entries = fx.log.entries().await;
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].success);
        assert_eq!(entries[0].response_status, Some(500));
    }

    #[tokio::test]
    async fn duplicate_delivery_writes_once_and_notifies_once() {
        let fx = fixture().await;
        let sub = stored(ClinicId::new(), "sub_123", SubscriptionStatus::Pending);
        let id = sub.id;
        fx.repo.seed(sub).await;

        fx.handler.handle(confirmed("sub_123")).await.unwrap();
        let updated_at = fx.repo.get(&id).await.unwrap().updated_at;

        let second = fx.handler.handle(confirmed("sub_123")).await.unwrap();

        assert!(matches!(second, HandleBillingWebhookResult::AlreadyApplied { .. }));
        assert_eq!(fx.repo.status_write_count(), 1);
        assert_eq!(fx.repo.get(&id).await.unwrap().updated_at, updated_at);
        assert_eq!(fx.notifier.deliveries().await.len(), 1);
    }

    #[tokio::test]
    async fn subscription_activated_does_not_promote_pending() {
        let fx = fixture().await;
        let sub = stored(ClinicId::new(), "sub_9", SubscriptionStatus::Pending);
        let id = sub.id;
        fx.repo.seed(sub).await;

        let result = fx
            .handler
            .handle(command(json!({
                "event": "SUBSCRIPTION_ACTIVATED",
                "subscription": {"id": "sub_9", "status": "ACTIVE"}
            })))
            .await
            .unwrap();

        assert!(matches!(
            result,
            HandleBillingWebhookResult::Acknowledged {
                status: SubscriptionStatus::Pending,
                ..
            }
        ));
        assert_eq!(fx.repo.get(&id).await.unwrap().status, SubscriptionStatus::Pending);
        assert_eq!(fx.repo.status_write_count(), 0);
        // Allow-listed, so still forwarded.
        assert_eq!(fx.notifier.deliveries().await.len(), 1);
    }

    #[tokio::test]
    async fn renewal_does_not_promote_pending() {
        let fx = fixture().await;
        fx.repo
            .seed(stored(ClinicId::new(), "sub_9", SubscriptionStatus::Pending))
            .await;

        let result = fx
            .handler
            .handle(command(json!({
                "event": "SUBSCRIPTION_RENEWED",
                "subscription": {"id": "sub_9"}
            })))
            .await
            .unwrap();

        assert!(matches!(result, HandleBillingWebhookResult::Acknowledged { .. }));
        assert_eq!(fx.repo.status_write_count(), 0);
    }

    #[tokio::test]
    async fn overdue_event_demotes_active() {
        let fx = fixture().await;
        let sub = stored(ClinicId::new(), "sub_1", SubscriptionStatus::Active);
        let id = sub.id;
        fx.repo.seed(sub).await;

        fx.handler
            .handle(command(json!({
                "event": "PAYMENT_OVERDUE",
                "payment": {"subscription": "sub_1", "status": "OVERDUE"}
            })))
            .await
            .unwrap();

        assert_eq!(fx.repo.get(&id).await.unwrap().status, SubscriptionStatus::Overdue);
    }

    #[tokio::test]
    async fn non_forwarded_event_updates_without_notification() {
        let fx = fixture().await;
        fx.repo
            .seed(stored(ClinicId::new(), "sub_1", SubscriptionStatus::Active))
            .await;

        let result = fx
            .handler
            .handle(command(json!({
                "event": "PAYMENT_DELETED",
                "payment": {"subscription": "sub_1"}
            })))
            .await
            .unwrap();

        assert!(matches!(
            result,
            HandleBillingWebhookResult::StatusUpdated {
                to: SubscriptionStatus::Inactive,
                ..
            }
        ));
        assert!(fx.notifier.deliveries().await.is_empty());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Resolution
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn resolves_by_external_reference() {
        let fx = fixture().await;
        let clinic = ClinicId::new();
        let sub = stored(clinic, "sub_local", SubscriptionStatus::Active);
        let id = sub.id;
        fx.repo.seed(sub).await;

        fx.handler
            .handle(command(json!({
                "event": "SUBSCRIPTION_CANCELED",
                "subscription": {"externalReference": format!("{}|Pro", clinic)}
            })))
            .await
            .unwrap();

        assert_eq!(fx.repo.get(&id).await.unwrap().status, SubscriptionStatus::Canceled);
    }

    #[tokio::test]
    async fn unknown_provider_id_falls_back_to_external_reference() {
        let fx = fixture().await;
        let clinic = ClinicId::new();
        let sub = stored(clinic, "sub_old", SubscriptionStatus::Active);
        let id = sub.id;
        fx.repo.seed(sub).await;

        fx.handler
            .handle(command(json!({
                "event": "PAYMENT_OVERDUE",
                "payment": {"subscription": "sub_new", "externalReference": format!("{}|Pro", clinic)}
            })))
            .await
            .unwrap();

        assert_eq!(fx.repo.get(&id).await.unwrap().status, SubscriptionStatus::Overdue);
    }

    #[tokio::test]
    async fn no_matching_row_is_not_found() {
        let fx = fixture().await;
        let err = fx.handler.handle(confirmed("sub_missing")).await.unwrap_err();
        assert!(matches!(err, BillingError::NotFound(_)));
        assert!(fx.notifier.deliveries().await.is_empty());
    }

    #[tokio::test]
    async fn no_identifier_is_bad_request() {
        let fx = fixture().await;
        let err = fx
            .handler
            .handle(command(json!({"event": "PAYMENT_CONFIRMED", "payment": {"id": "pay_1"}})))
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::BadRequest(_)));
    }

    #[tokio::test]
    async fn garbage_external_reference_alone_is_bad_request() {
        let fx = fixture().await;
        let err = fx
            .handler
            .handle(command(json!({
                "event": "PAYMENT_CONFIRMED",
                "payment": {"externalReference": "not-a-clinic"}
            })))
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::BadRequest(_)));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Input Validation
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn unknown_event_is_ignored_without_side_effects() {
        let fx = fixture().await;
        let result = fx.handler.handle(command(json!({"event": "FOO_BAR"}))).await.unwrap();

        assert_eq!(
            result,
            HandleBillingWebhookResult::Ignored {
                event: "FOO_BAR".to_string()
            }
        );
        assert_eq!(fx.repo.status_write_count(), 0);
        assert!(fx.notifier.deliveries().await.is_empty());
    }

    #[tokio::test]
    async fn missing_event_is_bad_request() {
        let fx = fixture().await;
        let err = fx
            .handler
            .handle(command(json!({"payment": {"subscription": "sub_1"}})))
            .await
            .unwrap_err();
        assert_eq!(err, BillingError::bad_request("Missing event"));
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let fx = fixture().await;
        let err = fx
            .handler
            .handle(HandleBillingWebhookCommand {
                payload: b"{not json".to_vec(),
                access_token: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::BadRequest(_)));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Token Authentication
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn wrong_token_is_rejected_before_parsing() {
        let fx = fixture().await;
        let handler = fx
            .handler
            .with_webhook_token(Some(SecretString::new("s3cret".to_string())));

        let err = handler
            .handle(HandleBillingWebhookCommand {
                payload: b"{not json".to_vec(),
                access_token: Some("wrong".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::Unauthenticated(_)));

        let missing = handler
            .handle(HandleBillingWebhookCommand {
                payload: b"{}".to_vec(),
                access_token: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(missing, BillingError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn correct_token_is_accepted() {
        let fx = fixture().await;
        let handler = fx
            .handler
            .with_webhook_token(Some(SecretString::new("s3cret".to_string())));

        let mut cmd = command(json!({"event": "FOO_BAR"}));
        cmd.access_token = Some("s3cret".to_string());

        assert!(handler.handle(cmd).await.is_ok());
    }
}
