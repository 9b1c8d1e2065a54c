//! HTTP handlers for subscription endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use secrecy::SecretString;

use crate::adapters::http::middleware::RequireAuth;
use crate::application::{
    AutomationForwarder, CreateSubscriptionCommand, CreateSubscriptionHandler,
    GetSubscriptionHandler, GetSubscriptionQuery, HandleBillingWebhookCommand,
    HandleBillingWebhookHandler,
};
use crate::domain::billing::BillingError;
use crate::ports::{BillingProvider, ClinicDirectory, SubscriptionRepository};

use super::dto::{
    CreateSubscriptionRequest, CreateSubscriptionResponse, ErrorResponse, GetSubscriptionParams,
    SubscriptionResponse, WebhookResponse,
};

/// Header carrying the shared webhook token.
pub const WEBHOOK_TOKEN_HEADER: &str = "asaas-access-token";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned for each request; every dependency is Arc-wrapped.
#[derive(Clone)]
pub struct SubscriptionAppState {
    pub subscription_repository: Arc<dyn SubscriptionRepository>,
    pub billing_provider: Arc<dyn BillingProvider>,
    pub clinic_directory: Arc<dyn ClinicDirectory>,
    pub forwarder: Arc<AutomationForwarder>,
    pub webhook_token: Option<SecretString>,
}

impl SubscriptionAppState {
    /// Create handlers on demand from the shared state.
    pub fn create_subscription_handler(&self) -> CreateSubscriptionHandler {
        CreateSubscriptionHandler::new(
            self.subscription_repository.clone(),
            self.billing_provider.clone(),
            self.clinic_directory.clone(),
        )
    }

    pub fn get_subscription_handler(&self) -> GetSubscriptionHandler {
        GetSubscriptionHandler::new(
            self.subscription_repository.clone(),
            self.billing_provider.clone(),
            self.clinic_directory.clone(),
        )
    }

    pub fn webhook_handler(&self) -> HandleBillingWebhookHandler {
        HandleBillingWebhookHandler::new(
            self.subscription_repository.clone(),
            self.forwarder.clone(),
        )
        .with_webhook_token(self.webhook_token.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /subscriptions?clinic_id= - Current subscription or trial for a clinic
pub async fn get_subscription(
    State(state): State<SubscriptionAppState>,
    RequireAuth(user): RequireAuth,
    params: Result<Query<GetSubscriptionParams>, QueryRejection>,
) -> Result<impl IntoResponse, BillingApiError> {
    let Query(params) = params.map_err(|e| BillingError::bad_request(e.body_text()))?;
    let clinic_id = params
        .clinic_id
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| BillingError::bad_request("clinic_id is required"))?;

    let view = state
        .get_subscription_handler()
        .handle(GetSubscriptionQuery { user, clinic_id })
        .await?;

    Ok(Json(SubscriptionResponse::from(view)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /subscriptions - Start a subscription with the billing provider
pub async fn create_subscription(
    State(state): State<SubscriptionAppState>,
    RequireAuth(user): RequireAuth,
    request: Result<Json<CreateSubscriptionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, BillingApiError> {
    let Json(request) = request.map_err(|e| BillingError::bad_request(e.body_text()))?;

    let cmd = CreateSubscriptionCommand {
        user,
        clinic_id: request.clinic_id,
        plan_name: request.plan_name,
        value: request.value,
        cycle: request.cycle,
        billing_type: request.billing_type,
        description: request.description,
    };

    let result = state.create_subscription_handler().handle(cmd).await?;

    Ok(Json(CreateSubscriptionResponse::from(result)))
}

/// POST /webhooks/asaas - Handle billing provider webhook events
pub async fn handle_asaas_webhook(
    State(state): State<SubscriptionAppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse, BillingApiError> {
    let access_token = headers
        .get(WEBHOOK_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = HandleBillingWebhookCommand {
        payload: body.to_vec(),
        access_token,
    };

    let result = state.webhook_handler().handle(cmd).await?;

    Ok(Json(WebhookResponse::from(result)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts billing errors to HTTP responses.
#[derive(Debug)]
pub struct BillingApiError(BillingError);

impl From<BillingError> for BillingApiError {
    fn from(err: BillingError) -> Self {
        Self(err)
    }
}

impl BillingApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BillingError::BadRequest(_) => StatusCode::BAD_REQUEST,
            BillingError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            BillingError::Forbidden(_) => StatusCode::FORBIDDEN,
            BillingError::NotFound(_) => StatusCode::NOT_FOUND,
            BillingError::Upstream(_) | BillingError::Persistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for BillingApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.0.code(), error = %self.0, "Request failed");
        }
        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_statuses_follow_taxonomy() {
        let cases = [
            (BillingError::bad_request("x"), StatusCode::BAD_REQUEST),
            (BillingError::unauthenticated("x"), StatusCode::UNAUTHORIZED),
            (BillingError::forbidden("x"), StatusCode::FORBIDDEN),
            (BillingError::not_found("x"), StatusCode::NOT_FOUND),
            (BillingError::upstream("x"), StatusCode::INTERNAL_SERVER_ERROR),
            (BillingError::persistence("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(BillingApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn into_response_uses_mapped_status() {
        let response = BillingApiError::from(BillingError::forbidden("nope")).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn state_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SubscriptionAppState>();
    }
}
