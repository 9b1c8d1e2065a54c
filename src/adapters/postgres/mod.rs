//! PostgreSQL adapters - Database implementations for storage ports.
//!
//! - `PostgresSubscriptionRepository` - Subscription rows and conditional status writes
//! - `PostgresClinicDirectory` - Read access to clinics, profiles and memberships
//! - `PostgresNotificationLog` - Automation delivery log
//! - `PostgresSettingsReader` - Key-value system settings

mod clinic_directory;
mod notification_log;
mod settings_reader;
mod subscription_repository;

pub use clinic_directory::PostgresClinicDirectory;
pub use notification_log::PostgresNotificationLog;
pub use settings_reader::PostgresSettingsReader;
pub use subscription_repository::PostgresSubscriptionRepository;
