//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers (write) are kept apart from query handlers (read).

pub mod handlers;

pub use handlers::subscription::{
    AutomationForwarder, CreateSubscriptionCommand, CreateSubscriptionHandler,
    CreateSubscriptionResult, CurrentSubscription, ForwardOutcome, GetSubscriptionHandler,
    GetSubscriptionQuery, HandleBillingWebhookCommand, HandleBillingWebhookHandler,
    HandleBillingWebhookResult, SubscriptionView, DEFAULT_SETTINGS_KEY, FIRST_DUE_IN_DAYS,
};
