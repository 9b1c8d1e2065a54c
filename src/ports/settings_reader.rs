//! Runtime settings port.
//!
//! Key/value settings editable by platform administrators without a
//! redeploy (for example the automation endpoint URL).

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

#[async_trait]
pub trait SettingsReader: Send + Sync {
    /// Value stored under `key`, or `None` when unset.
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError>;
}
