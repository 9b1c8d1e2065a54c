//! In-memory port implementations for tests and local development.

mod clinic_directory;
mod notification_log;
mod settings;
mod subscription_repository;

pub use clinic_directory::InMemoryClinicDirectory;
pub use notification_log::InMemoryNotificationLog;
pub use settings::InMemorySettings;
pub use subscription_repository::InMemorySubscriptionRepository;
