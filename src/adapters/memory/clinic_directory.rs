//! In-memory clinic directory.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::RwLock;

use crate::domain::foundation::{ClinicId, DomainError, Timestamp, UserId};
use crate::ports::{ClinicDirectory, ClinicRecord, ProfileRecord};

#[derive(Debug, Clone, Default)]
pub struct InMemoryClinicDirectory {
    clinics: Arc<RwLock<HashMap<ClinicId, ClinicRecord>>>,
    profiles: Arc<RwLock<HashMap<UserId, ProfileRecord>>>,
    members: Arc<RwLock<HashSet<(UserId, ClinicId)>>>,
}

impl InMemoryClinicDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clinic owned by `owner`, created at `created_at`.
    pub async fn add_clinic(&self, id: ClinicId, owner: Option<UserId>, created_at: Timestamp) {
        let details = json!({
            "id": id,
            "owner_id": owner,
            "created_at": created_at,
        });
        self.clinics.write().await.insert(
            id,
            ClinicRecord {
                id,
                owner_id: owner,
                created_at,
                details,
            },
        );
    }

    pub async fn add_profile(&self, profile: ProfileRecord) {
        self.profiles.write().await.insert(profile.id, profile);
    }

    /// Grant a non-owner access to a clinic.
    pub async fn add_member(&self, user: UserId, clinic: ClinicId) {
        self.members.write().await.insert((user, clinic));
    }
}

#[async_trait]
impl ClinicDirectory for InMemoryClinicDirectory {
    async fn find_clinic(&self, clinic_id: &ClinicId) -> Result<Option<ClinicRecord>, DomainError> {
        Ok(self.clinics.read().await.get(clinic_id).cloned())
    }

    async fn find_profile(&self, user_id: &UserId) -> Result<Option<ProfileRecord>, DomainError> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn is_member(&self, user_id: &UserId, clinic_id: &ClinicId) -> Result<bool, DomainError> {
        let owns = self
            .clinics
            .read()
            .await
            .get(clinic_id)
            .map(|c| c.owner_id.as_ref() == Some(user_id))
            .unwrap_or(false);

        Ok(owns || self.members.read().await.contains(&(*user_id, *clinic_id)))
    }
}
