//! Recording notifier for tests.
//!
//! Captures every delivery instead of sending it, and can be told to fail.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::ports::{AutomationNotifier, DeliveryError, DeliveryReceipt};

/// One captured delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub url: String,
    pub payload: Value,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    deliveries: Arc<RwLock<Vec<Delivery>>>,
    failure: Arc<RwLock<Option<DeliveryError>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following delivery fail with `error` (still recorded).
    pub async fn fail_with(&self, error: DeliveryError) {
        *self.failure.write().await = Some(error);
    }

    pub async fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.read().await.clone()
    }
}

#[async_trait]
impl AutomationNotifier for RecordingNotifier {
    async fn deliver(&self, url: &str, payload: &Value) -> Result<DeliveryReceipt, DeliveryError> {
        self.deliveries.write().await.push(Delivery {
            url: url.to_string(),
            payload: payload.clone(),
        });

        match self.failure.read().await.as_ref() {
            Some(error) => Err(error.clone()),
            None => Ok(DeliveryReceipt { status: 200 }),
        }
    }
}
