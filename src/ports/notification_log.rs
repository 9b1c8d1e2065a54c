//! Notification log port.
//!
//! Records every attempt to forward an event to the automation endpoint,
//! successful or not.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::foundation::{DomainError, SubscriptionId, Timestamp};

#[async_trait]
pub trait NotificationLog: Send + Sync {
    async fn record(&self, entry: &NotificationLogEntry) -> Result<(), DomainError>;
}

/// One forwarding attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationLogEntry {
    pub subscription_id: SubscriptionId,
    pub event: String,
    pub url: String,
    pub payload: Value,
    pub success: bool,
    /// HTTP status from the endpoint, when it answered.
    pub response_status: Option<u16>,
    pub error: Option<String>,
    pub created_at: Timestamp,
}
