//! Authentication types for the domain layer.
//!
//! An `AuthenticatedUser` is whatever the `SessionValidator` port extracted
//! from a bearer token. The HTTP layer places it into request extensions.

use super::UserId;
use thiserror::Error;

/// Authenticated user extracted from a validated JWT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Subject of the token.
    pub id: UserId,

    /// Email claim, used as the billing customer key.
    pub email: String,
}

impl AuthenticatedUser {
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }
}

/// Authentication errors that can occur during token validation.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    /// The token is valid but carries no usable email claim.
    #[error("Token has no email claim")]
    MissingEmail,

    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this error indicates the user should re-authenticate.
    pub fn requires_reauthentication(&self) -> bool {
        !matches!(self, AuthError::ServiceUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn authenticated_user_new_creates_user() {
        let uuid = Uuid::new_v4();
        let user = AuthenticatedUser::new(UserId::from_uuid(uuid), "owner@clinic.test");

        assert_eq!(user.id.as_uuid(), &uuid);
        assert_eq!(user.email, "owner@clinic.test");
    }

    #[test]
    fn auth_error_service_unavailable_displays_message() {
        let err = AuthError::service_unavailable("Connection refused");
        assert_eq!(format!("{}", err), "Auth service unavailable: Connection refused");
    }

    #[test]
    fn auth_error_requires_reauthentication_for_token_errors() {
        assert!(AuthError::InvalidToken.requires_reauthentication());
        assert!(AuthError::TokenExpired.requires_reauthentication());
        assert!(AuthError::MissingEmail.requires_reauthentication());
        assert!(!AuthError::service_unavailable("").requires_reauthentication());
    }
}
