//! HTTP adapters - REST API implementations.
//!
//! Each domain module has its own HTTP adapter for endpoint exposure.

pub mod health;
pub mod middleware;
pub mod subscription;

use axum::Router;

pub use middleware::AuthState;
pub use subscription::{subscription_router, SubscriptionAppState};

/// Complete application router with state applied.
pub fn app_router(state: SubscriptionAppState, auth: AuthState) -> Router {
    Router::new()
        .merge(health::health_routes())
        .merge(subscription_router(auth))
        .with_state(state)
}
