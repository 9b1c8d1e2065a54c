//! Billing provider configuration (Asaas)

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;
use crate::adapters::asaas::{AsaasConfig, DEFAULT_BASE_URL};

#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Asaas API key, sent as the `access_token` header
    pub asaas_api_key: SecretString,

    #[serde(default = "default_base_url")]
    pub asaas_base_url: String,

    /// Shared token Asaas sends in `asaas-access-token`; unset disables the check
    #[serde(default)]
    pub webhook_token: Option<SecretString>,

    /// Timeout for provider calls in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl BillingConfig {
    /// Adapter configuration for the Asaas client.
    pub fn asaas(&self) -> AsaasConfig {
        AsaasConfig::new(self.asaas_api_key.expose_secret().as_str())
            .with_base_url(&self.asaas_base_url)
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }

    /// Webhook token, if a non-blank one is configured.
    pub fn webhook_token(&self) -> Option<SecretString> {
        self.webhook_token
            .as_ref()
            .filter(|t| !t.expose_secret().trim().is_empty())
            .cloned()
    }

    pub fn is_sandbox(&self) -> bool {
        self.asaas_base_url.contains("sandbox")
    }

    pub fn validate(&self, environment: Environment) -> Result<(), ValidationError> {
        if self.asaas_api_key.expose_secret().trim().is_empty() {
            return Err(ValidationError::MissingRequired("billing.asaas_api_key"));
        }
        if !self.asaas_base_url.starts_with("http://") && !self.asaas_base_url.starts_with("https://")
        {
            return Err(ValidationError::InvalidUrl("billing.asaas_base_url"));
        }
        if environment == Environment::Production {
            if !self.asaas_base_url.starts_with("https://") {
                return Err(ValidationError::MustBeHttps("billing.asaas_base_url"));
            }
            if self.webhook_token().is_none() {
                return Err(ValidationError::MissingRequired("billing.webhook_token"));
            }
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("billing.timeout_secs"));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    15
}
