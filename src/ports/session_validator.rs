//! Session validation port for bearer token validation.
//!
//! Provider-agnostic: the production adapter verifies HS256 JWTs issued by
//! the platform's auth service; tests use a token table.
//!
//! All implementations MUST validate signature, audience and expiry.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Validates access tokens and extracts user identity.
///
/// # Contract
///
/// - `AuthError::InvalidToken` for malformed or badly signed tokens
/// - `AuthError::TokenExpired` for expired tokens
/// - `AuthError::MissingEmail` when the token has no email claim
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a raw token (without the `Bearer ` prefix).
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_validator_is_object_safe() {
        fn _accepts_dyn(_validator: &dyn SessionValidator) {}
    }
}
