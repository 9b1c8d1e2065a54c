//! Foundation module - Shared domain primitives.
//!
//! Identifiers, time, authentication and error types used by
//! the billing domain and every port.

mod auth;
mod errors;
mod ids;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ClinicId, SubscriptionId, UserId};
pub use timestamp::Timestamp;
