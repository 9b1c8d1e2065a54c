//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `SubscriptionRepository` - subscription rows, conditional status writes
//! - `ClinicDirectory` - clinics, profiles and memberships (read only)
//! - `NotificationLog` - record of automation forwarding attempts
//! - `SettingsReader` - runtime key/value settings
//!
//! ## External Service Ports
//!
//! - `BillingProvider` - customers, subscriptions and charges at the gateway
//! - `AutomationNotifier` - outbound JSON webhook
//! - `SessionValidator` - bearer token validation

mod automation_notifier;
mod billing_provider;
mod clinic_directory;
mod notification_log;
mod session_validator;
mod settings_reader;
mod subscription_repository;

pub use automation_notifier::{AutomationNotifier, DeliveryError, DeliveryReceipt};
pub use billing_provider::{
    BillingProvider, NewCustomer, NewSubscription, ProviderCustomer, ProviderError,
    ProviderErrorCode, ProviderPayment, ProviderSubscription,
};
pub use clinic_directory::{ClinicDirectory, ClinicRecord, ProfileRecord};
pub use notification_log::{NotificationLog, NotificationLogEntry};
pub use session_validator::SessionValidator;
pub use settings_reader::SettingsReader;
pub use subscription_repository::SubscriptionRepository;
