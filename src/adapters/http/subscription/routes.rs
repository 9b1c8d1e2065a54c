//! Axum router configuration for subscription endpoints.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::adapters::http::middleware::{auth_middleware, AuthState};

use super::handlers::{
    create_subscription, get_subscription, handle_asaas_webhook, SubscriptionAppState,
};

/// Create the subscription API router.
///
/// # Routes (require authentication)
/// - `GET /` - Current subscription or trial for `?clinic_id=`
/// - `POST /` - Start a subscription
pub fn subscription_routes(auth: AuthState) -> Router<SubscriptionAppState> {
    Router::new()
        .route("/", get(get_subscription).post(create_subscription))
        .route_layer(middleware::from_fn_with_state(auth, auth_middleware))
}

/// Create the billing webhook router.
///
/// Separate from the subscription routes because webhooks carry no user
/// session (they are verified by shared token when one is configured).
///
/// # Routes
/// - `POST /asaas` - Handle billing provider webhooks
pub fn webhook_routes() -> Router<SubscriptionAppState> {
    Router::new().route("/asaas", post(handle_asaas_webhook))
}

/// Create the complete subscription module router, mounted at
/// `/subscriptions` and `/webhooks`.
pub fn subscription_router(auth: AuthState) -> Router<SubscriptionAppState> {
    Router::new()
        .nest("/subscriptions", subscription_routes(auth))
        .nest("/webhooks", webhook_routes())
}
