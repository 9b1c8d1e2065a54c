//! Automation notifier port.
//!
//! Delivers a JSON payload to an external automation endpoint
//! (workflow tools such as n8n or Zapier).

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[async_trait]
pub trait AutomationNotifier: Send + Sync {
    /// POST `payload` to `url`. Any non-2xx answer is an error.
    async fn deliver(&self, url: &str, payload: &Value) -> Result<DeliveryReceipt, DeliveryError>;
}

/// Successful delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub status: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DeliveryError {
    pub message: String,
    /// HTTP status, when the endpoint answered.
    pub status: Option<u16>,
}

impl DeliveryError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn rejected(status: u16, body: &str) -> Self {
        Self {
            message: format!("endpoint returned {}: {}", status, body),
            status: Some(status),
        }
    }
}
