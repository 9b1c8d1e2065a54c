//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Unique identifier for a locally stored subscription row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Creates a new random SubscriptionId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a SubscriptionId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubscriptionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Identifier of a clinic (the tenant that owns subscriptions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClinicId(Uuid);

impl ClinicId {
    /// Creates a new random ClinicId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a ClinicId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parses a ClinicId from user input, reporting the field on failure.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("clinic_id"));
        }
        Uuid::parse_str(trimmed)
            .map(Self)
            .map_err(|e| ValidationError::invalid_format("clinic_id", e.to_string()))
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ClinicId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClinicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClinicId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Identifier of an authenticated platform user (the `sub` claim).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a UserId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parses a UserId from a token subject.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if raw.is_empty() {
            return Err(ValidationError::empty_field("user_id"));
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|e| ValidationError::invalid_format("user_id", e.to_string()))
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_id_generates_unique_values() {
        let a = SubscriptionId::new();
        let b = SubscriptionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn subscription_id_parses_from_string() {
        let id = SubscriptionId::new();
        let parsed: SubscriptionId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn clinic_id_parse_trims_whitespace() {
        let uuid = Uuid::new_v4();
        let parsed = ClinicId::parse(&format!("  {}  ", uuid)).unwrap();
        assert_eq!(parsed.as_uuid(), &uuid);
    }

    #[test]
    fn clinic_id_parse_rejects_empty() {
        match ClinicId::parse("   ") {
            Err(ValidationError::EmptyField { field }) => assert_eq!(field, "clinic_id"),
            other => panic!("expected EmptyField, got {:?}", other),
        }
    }

    #[test]
    fn clinic_id_parse_rejects_garbage() {
        assert!(matches!(
            ClinicId::parse("not-a-uuid"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn user_id_rejects_empty_subject() {
        assert!(UserId::parse("").is_err());
    }

    #[test]
    fn ids_serialize_transparently() {
        let uuid = Uuid::new_v4();
        let json = serde_json::to_string(&ClinicId::from_uuid(uuid)).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }
}
