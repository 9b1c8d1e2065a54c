//! Status vocabulary reported by the billing provider's REST API.
//!
//! These are the provider's own words, distinct from the local
//! [`SubscriptionStatus`](super::SubscriptionStatus).

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::SubscriptionStatus;

/// Live status of a provider subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderSubscriptionStatus {
    Active,
    Inactive,
    Expired,
    Other(String),
}

impl ProviderSubscriptionStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Self::Active,
            "INACTIVE" => Self::Inactive,
            "EXPIRED" => Self::Expired,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Expired => "EXPIRED",
            Self::Other(raw) => raw,
        }
    }

    /// Local status equivalent, when there is one.
    pub fn as_local(&self) -> Option<SubscriptionStatus> {
        match self {
            Self::Active => Some(SubscriptionStatus::Active),
            Self::Inactive => Some(SubscriptionStatus::Inactive),
            Self::Expired => Some(SubscriptionStatus::Expired),
            Self::Other(_) => None,
        }
    }
}

/// Status of a single provider charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderPaymentStatus {
    Pending,
    Received,
    Confirmed,
    Overdue,
    Refunded,
    Other(String),
}

impl ProviderPaymentStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "RECEIVED" => Self::Received,
            "CONFIRMED" => Self::Confirmed,
            "OVERDUE" => Self::Overdue,
            "REFUNDED" => Self::Refunded,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Received => "RECEIVED",
            Self::Confirmed => "CONFIRMED",
            Self::Overdue => "OVERDUE",
            Self::Refunded => "REFUNDED",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_overdue(&self) -> bool {
        matches!(self, Self::Overdue)
    }
}

impl Serialize for ProviderSubscriptionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProviderSubscriptionStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

impl Serialize for ProviderPaymentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProviderPaymentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}
