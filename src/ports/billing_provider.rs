//! Billing provider port.
//!
//! Contract for the external billing gateway that owns customers, recurring
//! subscriptions and their charges. The production adapter talks to Asaas.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::domain::billing::{
    BillingCycle, BillingType, PlanValue, ProviderPaymentStatus, ProviderSubscriptionStatus,
};

#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Look a customer up by e-mail. Returns the first match.
    async fn find_customer_by_email(
        &self,
        email: &str,
    ) -> Result<Option<ProviderCustomer>, ProviderError>;

    /// Create a customer.
    async fn create_customer(&self, request: NewCustomer)
        -> Result<ProviderCustomer, ProviderError>;

    /// Create a recurring subscription for a customer.
    async fn create_subscription(
        &self,
        request: NewSubscription,
    ) -> Result<ProviderSubscription, ProviderError>;

    /// Fetch the live state of a subscription.
    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<ProviderSubscription, ProviderError>;

    /// Most recent charge generated for a subscription, if any.
    async fn latest_payment(
        &self,
        subscription_id: &str,
    ) -> Result<Option<ProviderPayment>, ProviderError>;
}

/// Customer in the billing system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderCustomer {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Request to create a customer.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    /// CPF or CNPJ, digits only or formatted.
    pub cpf_cnpj: String,
    pub phone: String,
    pub external_reference: String,
}

/// Request to create a subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubscription {
    pub customer_id: String,
    pub billing_type: BillingType,
    pub cycle: BillingCycle,
    pub value: PlanValue,
    pub next_due_date: NaiveDate,
    pub description: Option<String>,
    pub external_reference: String,
}

/// Live subscription as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderSubscription {
    pub id: String,
    pub status: ProviderSubscriptionStatus,
    pub next_due_date: Option<NaiveDate>,
    /// Full provider object, passed through to callers as `asaas_data`.
    pub raw: Value,
}

/// One charge of a subscription.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderPayment {
    pub id: String,
    pub status: ProviderPaymentStatus,
    pub due_date: Option<NaiveDate>,
    /// Hosted invoice page where the clinic can pay.
    pub invoice_url: Option<String>,
    pub raw: Value,
}

/// Errors from billing provider operations.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderError {
    pub code: ProviderErrorCode,

    /// Human-readable message, provider text included.
    pub message: String,

    /// HTTP status returned by the provider, if any.
    pub status: Option<u16>,
}

impl ProviderError {
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Transport failure before a response arrived.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NetworkError, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::AuthenticationError, message)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(ProviderErrorCode::NotFound, format!("{} not found", resource))
    }

    /// Non-success response from the provider API.
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ApiError, body).with_status(status)
    }

    /// The provider answered with something we could not decode.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ProviderError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorCode {
    NetworkError,
    AuthenticationError,
    NotFound,
    ApiError,
    InvalidResponse,
}

impl std::fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProviderErrorCode::NetworkError => "network_error",
            ProviderErrorCode::AuthenticationError => "authentication_error",
            ProviderErrorCode::NotFound => "not_found",
            ProviderErrorCode::ApiError => "api_error",
            ProviderErrorCode::InvalidResponse => "invalid_response",
        };
        write!(f, "{}", s)
    }
}
