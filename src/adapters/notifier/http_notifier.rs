//! HTTP automation notifier.
//!
//! POSTs JSON payloads to an external automation endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::ports::{AutomationNotifier, DeliveryError, DeliveryReceipt};

pub struct HttpAutomationNotifier {
    http_client: reqwest::Client,
}

impl HttpAutomationNotifier {
    pub fn new(timeout: Duration) -> Result<Self, DeliveryError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeliveryError::transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl AutomationNotifier for HttpAutomationNotifier {
    async fn deliver(&self, url: &str, payload: &Value) -> Result<DeliveryReceipt, DeliveryError> {
        let response = self
            .http_client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| DeliveryError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::rejected(status.as_u16(), &body));
        }

        Ok(DeliveryReceipt {
            status: status.as_u16(),
        })
    }
}
