//! Billing module - subscription lifecycle for clinics.
//!
//! Holds the status vocabulary, the provider event table, the trust rules
//! that guard status writes, and the trial window.

mod aggregate;
mod errors;
mod event_mapping;
mod external_reference;
mod plan;
mod provider_status;
pub mod reconciliation;
mod status;
mod trial;
mod webhook;

pub use aggregate::{PlanTerms, Subscription};
pub use errors::BillingError;
pub use event_mapping::{map_event, ProviderEvent, StatusMapping};
pub use external_reference::ExternalReference;
pub use plan::{BillingCycle, BillingType, PlanValue};
pub use provider_status::{ProviderPaymentStatus, ProviderSubscriptionStatus};
pub use status::SubscriptionStatus;
pub use trial::{trial_status, TrialStatus, TRIAL_DAYS};
pub use webhook::{WebhookPayload, WebhookPayment, WebhookSubscription};
