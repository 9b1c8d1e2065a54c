//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Shortest accepted HS256 secret.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Bearer token validation (HS256 shared secret)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret the platform's auth service signs tokens with
    pub jwt_secret: SecretString,

    /// Expected `aud` claim
    #[serde(default = "default_audience")]
    pub jwt_audience: String,
}

impl AuthConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let secret = self.jwt_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("auth.jwt_secret"));
        }
        if secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ValidationError::JwtSecretTooShort(MIN_JWT_SECRET_LEN));
        }
        if self.jwt_audience.trim().is_empty() {
            return Err(ValidationError::MissingRequired("auth.jwt_audience"));
        }
        Ok(())
    }
}

fn default_audience() -> String {
    "authenticated".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: SecretString::new(secret.to_string()),
            jwt_audience: default_audience(),
        }
    }

    #[test]
    fn test_short_secret_rejected() {
        assert_eq!(
            config("short").validate(),
            Err(ValidationError::JwtSecretTooShort(MIN_JWT_SECRET_LEN))
        );
        assert_eq!(
            config("").validate(),
            Err(ValidationError::MissingRequired("auth.jwt_secret"))
        );
    }

    #[test]
    fn test_long_secret_accepted() {
        assert!(config(&"x".repeat(MIN_JWT_SECRET_LEN)).validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", config("super-secret-value-that-is-long-enough"));
        assert!(!rendered.contains("super-secret"));
    }
}
