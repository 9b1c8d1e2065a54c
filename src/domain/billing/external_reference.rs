//! External reference stored on provider subscriptions.
//!
//! Encoded as `<clinic_id>|<plan_name>`. Customers carry the bare clinic
//! id, which parses the same way with an empty plan.

use std::fmt;

use crate::domain::foundation::{ClinicId, ValidationError};

const SEPARATOR: char = '|';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalReference {
    clinic_id: ClinicId,
    plan_name: Option<String>,
}

impl ExternalReference {
    pub fn new(clinic_id: ClinicId, plan_name: impl Into<String>) -> Self {
        Self {
            clinic_id,
            plan_name: Some(plan_name.into()),
        }
    }

    /// Reference for a customer record: just the clinic.
    pub fn for_customer(clinic_id: ClinicId) -> Self {
        Self {
            clinic_id,
            plan_name: None,
        }
    }

    /// Parses a reference received from the provider.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let (clinic, plan) = match raw.split_once(SEPARATOR) {
            Some((clinic, plan)) => (clinic, Some(plan)),
            None => (raw, None),
        };
        let clinic_id = ClinicId::parse(clinic)
            .map_err(|e| ValidationError::invalid_format("externalReference", e.to_string()))?;
        Ok(Self {
            clinic_id,
            plan_name: plan.filter(|p| !p.is_empty()).map(str::to_string),
        })
    }

    pub fn clinic_id(&self) -> ClinicId {
        self.clinic_id
    }

    pub fn plan_name(&self) -> Option<&str> {
        self.plan_name.as_deref()
    }
}

impl fmt::Display for ExternalReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.plan_name {
            Some(plan) => write!(f, "{}{}{}", self.clinic_id, SEPARATOR, plan),
            None => write!(f, "{}", self.clinic_id),
        }
    }
}
