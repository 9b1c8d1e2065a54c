//! Automation notifier configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::handlers::subscription::DEFAULT_SETTINGS_KEY;

#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    /// `system_settings` key holding the endpoint URL
    #[serde(default = "default_settings_key")]
    pub settings_key: String,

    /// Endpoint used when the settings row is missing or empty
    #[serde(default)]
    pub fallback_url: Option<String>,

    /// Delivery timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl NotifierConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.settings_key.trim().is_empty() {
            return Err(ValidationError::MissingRequired("notifier.settings_key"));
        }
        if let Some(url) = self.fallback_url.as_deref().filter(|u| !u.trim().is_empty()) {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidUrl("notifier.fallback_url"));
            }
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("notifier.timeout_secs"));
        }
        Ok(())
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            settings_key: default_settings_key(),
            fallback_url: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_settings_key() -> String {
    DEFAULT_SETTINGS_KEY.to_string()
}

fn default_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NotifierConfig::default();
        assert_eq!(config.settings_key, "automation_webhook_url");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fallback_url_must_be_http() {
        let config = NotifierConfig {
            fallback_url: Some("ftp://hooks.test".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidUrl("notifier.fallback_url"))
        );
    }
}
