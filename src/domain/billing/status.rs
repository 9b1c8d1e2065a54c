//! Subscription lifecycle status.
//!
//! One canonical enumeration for every code path. Stored and serialized
//! upper case; parsing accepts any casing so rows written by older
//! clients (`'active'`) still load.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Status of a locally stored subscription row.
///
/// There is no transition table: every write is last-writer-wins, guarded
/// only by the trust rules in [`super::reconciliation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    /// Created locally, no confirmed payment yet.
    Pending,

    /// Paid and current.
    Active,

    /// A charge is past its due date.
    Overdue,

    /// Charges were deleted or refunded.
    Inactive,

    Canceled,

    Expired,
}

impl SubscriptionStatus {
    /// Canonical upper-case representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Pending => "PENDING",
            SubscriptionStatus::Active => "ACTIVE",
            SubscriptionStatus::Overdue => "OVERDUE",
            SubscriptionStatus::Inactive => "INACTIVE",
            SubscriptionStatus::Canceled => "CANCELED",
            SubscriptionStatus::Expired => "EXPIRED",
        }
    }

    /// Returns true if this status entitles the clinic to the product.
    pub fn has_access(&self) -> bool {
        matches!(self, SubscriptionStatus::Active)
    }

    /// All statuses, in declaration order.
    pub fn all() -> [SubscriptionStatus; 6] {
        [
            SubscriptionStatus::Pending,
            SubscriptionStatus::Active,
            SubscriptionStatus::Overdue,
            SubscriptionStatus::Inactive,
            SubscriptionStatus::Canceled,
            SubscriptionStatus::Expired,
        ]
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(SubscriptionStatus::Pending),
            "ACTIVE" => Ok(SubscriptionStatus::Active),
            "OVERDUE" => Ok(SubscriptionStatus::Overdue),
            "INACTIVE" => Ok(SubscriptionStatus::Inactive),
            // Both spellings have been seen in stored rows.
            "CANCELED" | "CANCELLED" => Ok(SubscriptionStatus::Canceled),
            "EXPIRED" => Ok(SubscriptionStatus::Expired),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown subscription status '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_any_casing() {
        assert_eq!("active".parse::<SubscriptionStatus>().unwrap(), SubscriptionStatus::Active);
        assert_eq!("Overdue".parse::<SubscriptionStatus>().unwrap(), SubscriptionStatus::Overdue);
        assert_eq!(" PENDING ".parse::<SubscriptionStatus>().unwrap(), SubscriptionStatus::Pending);
    }

    #[test]
    fn accepts_british_cancelled() {
        assert_eq!(
            "cancelled".parse::<SubscriptionStatus>().unwrap(),
            SubscriptionStatus::Canceled
        );
    }

    #[test]
    fn rejects_unknown_status() {
        assert!("TRIAL".parse::<SubscriptionStatus>().is_err());
    }

    #[test]
    fn as_str_round_trips_through_parse() {
        for status in SubscriptionStatus::all() {
            assert_eq!(status.as_str().parse::<SubscriptionStatus>().unwrap(), status);
        }
    }

    #[test]
    fn serializes_upper_case() {
        let json = serde_json::to_string(&SubscriptionStatus::Overdue).unwrap();
        assert_eq!(json, "\"OVERDUE\"");
    }

    #[test]
    fn only_active_has_access() {
        for status in SubscriptionStatus::all() {
            assert_eq!(status.has_access(), status == SubscriptionStatus::Active);
        }
    }
}
