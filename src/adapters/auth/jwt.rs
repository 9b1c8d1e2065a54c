//! HS256 JWT adapter for bearer-token validation.
//!
//! Implements the `SessionValidator` port for tokens signed with a shared
//! secret by the platform's auth service. Validates:
//! - **Signature**: HS256 with the configured secret
//! - **Audience (aud)**: Must contain the configured audience
//! - **Expiry (exp)**: Must be in the future
//!
//! The subject must be a UUID and an e-mail claim must be present; both
//! are needed to resolve the caller's profile and billing customer.

use async_trait::async_trait;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

/// Audience issued to signed-in users.
pub const DEFAULT_AUDIENCE: &str = "authenticated";

/// Configuration for the JWT validator.
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: SecretString,
    pub audience: String,
}

impl JwtConfig {
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            audience: DEFAULT_AUDIENCE.to_string(),
        }
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

/// Claims carried by session tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject - the user ID
    pub sub: String,

    /// Expiry timestamp (Unix epoch seconds)
    pub exp: i64,

    #[serde(default)]
    pub aud: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub role: Option<String>,
}

/// Validates HS256 session tokens.
pub struct JwtSessionValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionValidator {
    pub fn new(config: JwtConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.secret.expose_secret().as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&config.audience]);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub", "aud"]);

        Self {
            decoding_key,
            validation,
        }
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Token expired");
                    AuthError::TokenExpired
                }
                ErrorKind::InvalidAudience => {
                    tracing::warn!("Invalid audience in token");
                    AuthError::InvalidToken
                }
                _ => {
                    tracing::warn!(error = %e, "Token validation failed");
                    AuthError::InvalidToken
                }
            })?
            .claims;

        let user_id = UserId::parse(&claims.sub).map_err(|_| {
            tracing::warn!(sub = %claims.sub, "Token subject is not a user id");
            AuthError::InvalidToken
        })?;

        let email = claims
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| {
                tracing::warn!(user_id = %user_id, "Token missing email claim");
                AuthError::MissingEmail
            })?;

        Ok(AuthenticatedUser::new(user_id, email))
    }
}

impl std::fmt::Debug for JwtSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSessionValidator").finish_non_exhaustive()
    }
}
