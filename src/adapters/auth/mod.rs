//! Authentication adapters.
//!
//! Implementations of the `SessionValidator` port:
//!
//! - `jwt` - HS256 bearer tokens signed by the platform's auth service
//! - `mock` - Test implementation that doesn't require signed tokens

mod jwt;
mod mock;

pub use jwt::{JwtConfig, JwtSessionValidator, SessionClaims, DEFAULT_AUDIENCE};
pub use mock::MockSessionValidator;
