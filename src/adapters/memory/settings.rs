//! In-memory runtime settings.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::DomainError;
use crate::ports::SettingsReader;

#[derive(Debug, Clone, Default)]
pub struct InMemorySettings {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, key: &str, value: &str) {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
    }
}

#[async_trait]
impl SettingsReader for InMemorySettings {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.values.read().await.get(key).cloned())
    }
}
