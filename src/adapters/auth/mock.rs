//! Mock session validator for testing.
//!
//! Maps fixed tokens to users so handlers and routers can be exercised
//! without signing real JWTs.
//!
//! # Example
//!
//! ```ignore
//! let validator = MockSessionValidator::new()
//!     .with_user("valid-token", AuthenticatedUser::new(user_id, "owner@clinic.test"));
//!
//! let result = validator.validate("valid-token").await;
//! assert!(result.is_ok());
//! ```

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::ports::SessionValidator;

/// Tokens not in the map return `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: RwLock<HashMap<String, AuthenticatedUser>>,
    /// Returned for every validation when set
    force_error: RwLock<Option<AuthError>>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a valid token that maps to a user.
    pub fn with_user(self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.add_token(token, user);
        self
    }

    /// Forces all validations to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        *write(&self.force_error) = Some(error);
        self
    }

    /// Registers a new valid token at runtime.
    pub fn add_token(&self, token: impl Into<String>, user: AuthenticatedUser) {
        write(&self.tokens).insert(token.into(), user);
    }

    pub fn clear_error(&self) {
        *write(&self.force_error) = None;
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if let Some(error) = read(&self.force_error).clone() {
            return Err(error);
        }

        read(&self.tokens)
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
