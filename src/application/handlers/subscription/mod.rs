//! Subscription handlers.
//!
//! Command and query handlers for the subscription lifecycle:
//!
//! ## Commands
//! - Originating a subscription with the billing provider
//! - Processing billing provider webhooks
//!
//! ## Queries
//! - Get a clinic's subscription, reconciled against the provider
//!
//! ## Services
//! - Forwarding billing events to the automation endpoint

mod create_subscription;
mod forward_notification;
mod get_subscription;
mod handle_billing_webhook;

// Commands
pub use create_subscription::{
    CreateSubscriptionCommand, CreateSubscriptionHandler, CreateSubscriptionResult,
    FIRST_DUE_IN_DAYS,
};
pub use handle_billing_webhook::{
    HandleBillingWebhookCommand, HandleBillingWebhookHandler, HandleBillingWebhookResult,
};

// Queries
pub use get_subscription::{
    CurrentSubscription, GetSubscriptionHandler, GetSubscriptionQuery, SubscriptionView,
};

// Services
pub use forward_notification::{AutomationForwarder, ForwardOutcome, DEFAULT_SETTINGS_KEY};
