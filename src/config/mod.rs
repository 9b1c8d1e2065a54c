//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `CLINIC_BILLING`
//! prefix and `__` between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use clinic_billing::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod billing;
mod database;
mod error;
mod notifier;
mod server;

pub use auth::{AuthConfig, MIN_JWT_SECRET_LEN};
pub use billing::BillingConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use notifier::NotifierConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    /// Bearer token validation
    pub auth: AuthConfig,

    /// Asaas credentials and webhook token
    pub billing: BillingConfig,

    /// Automation endpoint forwarding
    #[serde(default)]
    pub notifier: NotifierConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` if present, then reads `CLINIC_BILLING__*` variables:
    ///
    /// - `CLINIC_BILLING__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `CLINIC_BILLING__BILLING__ASAAS_API_KEY=...` -> `billing.asaas_api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CLINIC_BILLING")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate()?;
        self.billing.validate(self.server.environment)?;
        self.notifier.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[(&str, &str)] = &[
        ("CLINIC_BILLING__DATABASE__URL", "postgresql://test@localhost/test"),
        ("CLINIC_BILLING__AUTH__JWT_SECRET", "0123456789abcdef0123456789abcdef"),
        ("CLINIC_BILLING__BILLING__ASAAS_API_KEY", "$aact_test"),
    ];

    const OPTIONAL: &[&str] = &[
        "CLINIC_BILLING__SERVER__PORT",
        "CLINIC_BILLING__SERVER__ENVIRONMENT",
        "CLINIC_BILLING__BILLING__WEBHOOK_TOKEN",
        "CLINIC_BILLING__NOTIFIER__FALLBACK_URL",
    ];

    fn set_minimal_env() {
        for (key, value) in VARS {
            env::set_var(key, value);
        }
    }

    fn clear_env() {
        for (key, _) in VARS {
            env::remove_var(key);
        }
        for key in OPTIONAL {
            env::remove_var(key);
        }
    }

    fn load_with(extra: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
        set_minimal_env();
        for (key, value) in extra {
            env::set_var(key, value);
        }
        let result = AppConfig::load();
        clear_env();
        result
    }

    #[test]
    fn test_load_from_environment() {
        let config = load_with(&[]).unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert_eq!(config.auth.jwt_audience, "authenticated");
        assert_eq!(config.billing.asaas_base_url, "https://api.asaas.com/v3");
        assert_eq!(config.notifier.settings_key, "automation_webhook_url");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_defaults() {
        let config = load_with(&[]).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
    }

    #[test]
    fn test_custom_server_port() {
        let config = load_with(&[("CLINIC_BILLING__SERVER__PORT", "3000")]).unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_production_requires_webhook_token() {
        let config = load_with(&[("CLINIC_BILLING__SERVER__ENVIRONMENT", "production")]).unwrap();
        assert!(config.is_production());
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("billing.webhook_token"))
        );

        let config = load_with(&[
            ("CLINIC_BILLING__SERVER__ENVIRONMENT", "production"),
            ("CLINIC_BILLING__BILLING__WEBHOOK_TOKEN", "hook-token"),
        ])
        .unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_notifier_fallback_url() {
        let config = load_with(&[(
            "CLINIC_BILLING__NOTIFIER__FALLBACK_URL",
            "https://automation.test/hook",
        )])
        .unwrap();
        assert_eq!(
            config.notifier.fallback_url.as_deref(),
            Some("https://automation.test/hook")
        );
    }
}
