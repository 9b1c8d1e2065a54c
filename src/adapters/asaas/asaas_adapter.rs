//! Asaas billing provider adapter.
//!
//! Implements `BillingProvider` against the Asaas v3 REST API. Requests
//! authenticate with the `access_token` header; the key is held as a
//! `secrecy::SecretString`.
//!
//! # Configuration
//!
//! ```ignore
//! let config = AsaasConfig::new(api_key).with_base_url("https://sandbox.asaas.com/api/v3");
//! let adapter = AsaasBillingAdapter::new(config)?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::ports::{
    BillingProvider, NewCustomer, NewSubscription, ProviderCustomer, ProviderError,
    ProviderPayment, ProviderSubscription,
};

use super::api_types::{
    latest_payment, payment_from_value, subscription_from_value, AsaasCustomer, AsaasList,
    CreateCustomerBody, CreateSubscriptionBody,
};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.asaas.com/v3";

/// Asaas API configuration.
#[derive(Clone)]
pub struct AsaasConfig {
    api_key: SecretString,
    base_url: String,
    timeout: Duration,
}

impl AsaasConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set a custom API base URL (sandbox or tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Asaas billing provider adapter.
pub struct AsaasBillingAdapter {
    config: AsaasConfig,
    http_client: reqwest::Client,
}

impl AsaasBillingAdapter {
    pub fn new(config: AsaasConfig) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("clinic-billing/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("access_token", self.config.api_key.expose_secret())
    }

    /// Send a request and decode a successful JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T, ProviderError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| ProviderError::network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::error!(operation, "Asaas rejected API key");
            return Err(ProviderError::authentication("Asaas rejected API key")
                .with_status(status.as_u16()));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                operation,
                status = status.as_u16(),
                error = %error_text,
                "Asaas request failed"
            );
            return Err(ProviderError::api(
                status.as_u16(),
                format!("Asaas API error: {}", error_text),
            ));
        }

        response.json().await.map_err(|e| {
            ProviderError::decode(format!("Failed to parse Asaas response: {}", e))
        })
    }
}

#[async_trait]
impl BillingProvider for AsaasBillingAdapter {
    async fn find_customer_by_email(
        &self,
        email: &str,
    ) -> Result<Option<ProviderCustomer>, ProviderError> {
        let request = self
            .http_client
            .get(self.url("/customers"))
            .query(&[("email", email)]);

        let list: AsaasList<AsaasCustomer> = self.send("find_customer_by_email", request).await?;
        Ok(list.data.into_iter().next().map(ProviderCustomer::from))
    }

    async fn create_customer(
        &self,
        request: NewCustomer,
    ) -> Result<ProviderCustomer, ProviderError> {
        let body = CreateCustomerBody::from(&request);
        let http_request = self.http_client.post(self.url("/customers")).json(&body);

        let customer: AsaasCustomer = self.send("create_customer", http_request).await?;
        tracing::info!(customer_id = %customer.id, "Asaas customer created");
        Ok(customer.into())
    }

    async fn create_subscription(
        &self,
        request: NewSubscription,
    ) -> Result<ProviderSubscription, ProviderError> {
        let body = CreateSubscriptionBody::from(&request);
        let http_request = self.http_client.post(self.url("/subscriptions")).json(&body);

        let raw: Value = self.send("create_subscription", http_request).await?;
        let subscription = subscription_from_value(raw)?;
        tracing::info!(
            provider_subscription_id = %subscription.id,
            customer_id = %request.customer_id,
            "Asaas subscription created"
        );
        Ok(subscription)
    }

    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<ProviderSubscription, ProviderError> {
        let request = self
            .http_client
            .get(self.url(&format!("/subscriptions/{}", subscription_id)));

        let raw: Value = self.send("get_subscription", request).await?;
        subscription_from_value(raw)
    }

    async fn latest_payment(
        &self,
        subscription_id: &str,
    ) -> Result<Option<ProviderPayment>, ProviderError> {
        let request = self
            .http_client
            .get(self.url(&format!("/subscriptions/{}/payments", subscription_id)));

        let list: AsaasList<Value> = self.send("latest_payment", request).await?;
        let payments = list
            .data
            .into_iter()
            .map(payment_from_value)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(latest_payment(payments))
    }
}
