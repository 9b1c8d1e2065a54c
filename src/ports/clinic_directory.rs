//! Clinic directory port (read side).
//!
//! Clinics, profiles and memberships are owned by the wider platform. This
//! service only reads them: to authorize callers, to build provider
//! customers, and to enrich automation payloads.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::foundation::{ClinicId, DomainError, Timestamp, UserId};

#[async_trait]
pub trait ClinicDirectory: Send + Sync {
    /// Find a clinic by id.
    async fn find_clinic(&self, clinic_id: &ClinicId) -> Result<Option<ClinicRecord>, DomainError>;

    /// Find a user's profile.
    async fn find_profile(&self, user_id: &UserId) -> Result<Option<ProfileRecord>, DomainError>;

    /// True if the user owns the clinic or is listed as a member of it.
    async fn is_member(&self, user_id: &UserId, clinic_id: &ClinicId) -> Result<bool, DomainError>;
}

/// A clinic row.
#[derive(Debug, Clone, PartialEq)]
pub struct ClinicRecord {
    pub id: ClinicId,
    pub owner_id: Option<UserId>,
    pub created_at: Timestamp,
    /// The complete row as JSON, forwarded as-is.
    pub details: Value,
}

/// A user profile row.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRecord {
    pub id: UserId,
    pub full_name: Option<String>,
    /// CPF or CNPJ.
    pub document: Option<String>,
    pub phone: Option<String>,
    /// The complete row as JSON, forwarded as-is.
    pub details: Value,
}

impl ProfileRecord {
    /// Name, document and phone when all three are present and non-blank.
    pub fn billing_identity(&self) -> Option<(&str, &str, &str)> {
        Some((
            present(&self.full_name)?,
            present(&self.document)?,
            present(&self.phone)?,
        ))
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
