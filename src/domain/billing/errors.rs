//! Billing error taxonomy.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | BadRequest | 400 |
//! | Unauthenticated | 401 |
//! | Forbidden | 403 |
//! | NotFound | 404 |
//! | Upstream | 500 |
//! | Persistence | 500 |

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillingError {
    /// Malformed or incomplete input.
    #[error("{0}")]
    BadRequest(String),

    /// Missing or invalid bearer token.
    #[error("{0}")]
    Unauthenticated(String),

    /// Caller has no access to the clinic.
    #[error("{0}")]
    Forbidden(String),

    /// No matching subscription.
    #[error("{0}")]
    NotFound(String),

    /// Billing provider or automation endpoint call failed.
    #[error("{0}")]
    Upstream(String),

    /// Local database failure.
    #[error("{0}")]
    Persistence(String),
}

impl BillingError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        BillingError::BadRequest(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        BillingError::Unauthenticated(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        BillingError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        BillingError::NotFound(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        BillingError::Upstream(message.into())
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        BillingError::Persistence(message.into())
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            BillingError::BadRequest(_) => "BAD_REQUEST",
            BillingError::Unauthenticated(_) => "UNAUTHENTICATED",
            BillingError::Forbidden(_) => "FORBIDDEN",
            BillingError::NotFound(_) => "NOT_FOUND",
            BillingError::Upstream(_) => "UPSTREAM_FAILURE",
            BillingError::Persistence(_) => "PERSISTENCE_FAILURE",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            BillingError::BadRequest(m)
            | BillingError::Unauthenticated(m)
            | BillingError::Forbidden(m)
            | BillingError::NotFound(m)
            | BillingError::Upstream(m)
            | BillingError::Persistence(m) => m,
        }
    }
}

impl From<ValidationError> for BillingError {
    fn from(err: ValidationError) -> Self {
        BillingError::BadRequest(err.to_string())
    }
}

impl From<DomainError> for BillingError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => BillingError::BadRequest(err.message),
            ErrorCode::SubscriptionNotFound | ErrorCode::ClinicNotFound => {
                BillingError::NotFound(err.message)
            }
            ErrorCode::DatabaseError | ErrorCode::InternalError => {
                BillingError::Persistence(err.message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_bare_message() {
        let err = BillingError::upstream("customer lookup failed: 503");
        assert_eq!(err.to_string(), "customer lookup failed: 503");
        assert_eq!(err.code(), "UPSTREAM_FAILURE");
    }

    #[test]
    fn validation_errors_become_bad_request() {
        let err: BillingError = ValidationError::empty_field("plan_name").into();
        assert_eq!(err, BillingError::bad_request("Field 'plan_name' cannot be empty"));
    }

    #[test]
    fn database_errors_become_persistence() {
        let err: BillingError = DomainError::database("connection reset").into();
        assert!(matches!(err, BillingError::Persistence(ref m) if m == "connection reset"));
    }

    #[test]
    fn not_found_codes_map_to_not_found() {
        let err: BillingError =
            DomainError::new(ErrorCode::SubscriptionNotFound, "no row").into();
        assert_eq!(err.code(), "NOT_FOUND");
    }
}
