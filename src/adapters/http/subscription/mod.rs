//! HTTP adapter for subscription endpoints.
//!
//! Exposes the billing domain via REST API:
//! - `GET /subscriptions?clinic_id=` - Current subscription, reconciled, or trial
//! - `POST /subscriptions` - Start a subscription with the billing provider
//! - `POST /webhooks/asaas` - Handle billing provider webhooks

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{BillingApiError, SubscriptionAppState, WEBHOOK_TOKEN_HEADER};
pub use routes::subscription_router;
