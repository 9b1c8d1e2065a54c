//! Billing provider event vocabulary and the status each event implies.
//!
//! The table is fixed: every known event maps to a target status or to
//! "unchanged". Any other name is ignored without side effects.

use std::fmt;

use super::SubscriptionStatus;

/// Events the billing provider posts to the webhook endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderEvent {
    PaymentConfirmed,
    PaymentReceived,
    PaymentRestored,
    PaymentOverdue,
    PaymentDeleted,
    PaymentRefunded,
    PaymentCreated,
    PaymentUpdated,
    PaymentAwaiting,
    PaymentDunningReceived,
    PaymentAnticipated,
    SubscriptionCreated,
    SubscriptionUpdated,
    SubscriptionDeleted,
    SubscriptionRenewed,
    SubscriptionActivated,
    SubscriptionCanceled,
    /// Any event name outside the table.
    Unknown(String),
}

impl ProviderEvent {
    /// Every recognised event, in table order.
    pub const KNOWN: [ProviderEvent; 17] = [
        ProviderEvent::PaymentConfirmed,
        ProviderEvent::PaymentReceived,
        ProviderEvent::PaymentRestored,
        ProviderEvent::PaymentOverdue,
        ProviderEvent::PaymentDeleted,
        ProviderEvent::PaymentRefunded,
        ProviderEvent::PaymentCreated,
        ProviderEvent::PaymentUpdated,
        ProviderEvent::PaymentAwaiting,
        ProviderEvent::PaymentDunningReceived,
        ProviderEvent::PaymentAnticipated,
        ProviderEvent::SubscriptionCreated,
        ProviderEvent::SubscriptionUpdated,
        ProviderEvent::SubscriptionDeleted,
        ProviderEvent::SubscriptionRenewed,
        ProviderEvent::SubscriptionActivated,
        ProviderEvent::SubscriptionCanceled,
    ];

    /// Parse an event name. Matching is exact; the provider always sends
    /// upper-case names.
    pub fn parse(name: &str) -> Self {
        match name {
            "PAYMENT_CONFIRMED" => Self::PaymentConfirmed,
            "PAYMENT_RECEIVED" => Self::PaymentReceived,
            "PAYMENT_RESTORED" => Self::PaymentRestored,
            "PAYMENT_OVERDUE" => Self::PaymentOverdue,
            "PAYMENT_DELETED" => Self::PaymentDeleted,
            "PAYMENT_REFUNDED" => Self::PaymentRefunded,
            "PAYMENT_CREATED" => Self::PaymentCreated,
            "PAYMENT_UPDATED" => Self::PaymentUpdated,
            "PAYMENT_AWAITING" => Self::PaymentAwaiting,
            "PAYMENT_DUNNING_RECEIVED" => Self::PaymentDunningReceived,
            "PAYMENT_ANTICIPATED" => Self::PaymentAnticipated,
            "SUBSCRIPTION_CREATED" => Self::SubscriptionCreated,
            "SUBSCRIPTION_UPDATED" => Self::SubscriptionUpdated,
            "SUBSCRIPTION_DELETED" => Self::SubscriptionDeleted,
            "SUBSCRIPTION_RENEWED" => Self::SubscriptionRenewed,
            "SUBSCRIPTION_ACTIVATED" => Self::SubscriptionActivated,
            "SUBSCRIPTION_CANCELED" => Self::SubscriptionCanceled,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::PaymentConfirmed => "PAYMENT_CONFIRMED",
            Self::PaymentReceived => "PAYMENT_RECEIVED",
            Self::PaymentRestored => "PAYMENT_RESTORED",
            Self::PaymentOverdue => "PAYMENT_OVERDUE",
            Self::PaymentDeleted => "PAYMENT_DELETED",
            Self::PaymentRefunded => "PAYMENT_REFUNDED",
            Self::PaymentCreated => "PAYMENT_CREATED",
            Self::PaymentUpdated => "PAYMENT_UPDATED",
            Self::PaymentAwaiting => "PAYMENT_AWAITING",
            Self::PaymentDunningReceived => "PAYMENT_DUNNING_RECEIVED",
            Self::PaymentAnticipated => "PAYMENT_ANTICIPATED",
            Self::SubscriptionCreated => "SUBSCRIPTION_CREATED",
            Self::SubscriptionUpdated => "SUBSCRIPTION_UPDATED",
            Self::SubscriptionDeleted => "SUBSCRIPTION_DELETED",
            Self::SubscriptionRenewed => "SUBSCRIPTION_RENEWED",
            Self::SubscriptionActivated => "SUBSCRIPTION_ACTIVATED",
            Self::SubscriptionCanceled => "SUBSCRIPTION_CANCELED",
            Self::Unknown(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Status implied by this event.
    pub fn mapping(&self) -> StatusMapping {
        use SubscriptionStatus::*;

        match self {
            Self::PaymentConfirmed
            | Self::PaymentReceived
            | Self::PaymentRestored
            | Self::PaymentDunningReceived
            | Self::PaymentAnticipated
            | Self::SubscriptionRenewed => StatusMapping::Apply(Active),
            Self::PaymentOverdue => StatusMapping::Apply(Overdue),
            Self::PaymentDeleted | Self::PaymentRefunded => StatusMapping::Apply(Inactive),
            Self::PaymentCreated | Self::PaymentAwaiting | Self::SubscriptionCreated => {
                StatusMapping::Apply(Pending)
            }
            Self::SubscriptionDeleted | Self::SubscriptionCanceled => {
                StatusMapping::Apply(Canceled)
            }
            // Activation is only trusted through a payment confirmation.
            Self::PaymentUpdated | Self::SubscriptionUpdated | Self::SubscriptionActivated => {
                StatusMapping::Unchanged
            }
            Self::Unknown(_) => StatusMapping::Ignore,
        }
    }

    /// Whether this event is forwarded to the automation endpoint.
    pub fn is_forwarded(&self) -> bool {
        matches!(
            self,
            Self::PaymentConfirmed
                | Self::PaymentReceived
                | Self::PaymentOverdue
                | Self::PaymentRefunded
                | Self::SubscriptionCreated
                | Self::SubscriptionActivated
                | Self::SubscriptionCanceled
                | Self::SubscriptionRenewed
        )
    }

    /// Whether this event proves money arrived, and may therefore move a
    /// pending subscription to active.
    pub fn confirms_payment(&self) -> bool {
        matches!(
            self,
            Self::PaymentConfirmed | Self::PaymentReceived | Self::PaymentDunningReceived
        )
    }
}

impl fmt::Display for ProviderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of looking an event up in the status table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMapping {
    /// Move the subscription to this status.
    Apply(SubscriptionStatus),
    /// Process the event but leave the status alone.
    Unchanged,
    /// Unrecognised event: no lookups, no writes, no notification.
    Ignore,
}

/// Maps a raw event name to its status effect.
pub fn map_event(name: &str) -> StatusMapping {
    ProviderEvent::parse(name).mapping()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use SubscriptionStatus::*;

    #[test]
    fn table_matches_documented_mapping() {
        let expected = [
            ("PAYMENT_CONFIRMED", StatusMapping::Apply(Active)),
            ("PAYMENT_RECEIVED", StatusMapping::Apply(Active)),
            ("PAYMENT_RESTORED", StatusMapping::Apply(Active)),
            ("PAYMENT_OVERDUE", StatusMapping::Apply(Overdue)),
            ("PAYMENT_DELETED", StatusMapping::Apply(Inactive)),
            ("PAYMENT_REFUNDED", StatusMapping::Apply(Inactive)),
            ("PAYMENT_CREATED", StatusMapping::Apply(Pending)),
            ("PAYMENT_UPDATED", StatusMapping::Unchanged),
            ("PAYMENT_AWAITING", StatusMapping::Apply(Pending)),
            ("PAYMENT_DUNNING_RECEIVED", StatusMapping::Apply(Active)),
            ("PAYMENT_ANTICIPATED", StatusMapping::Apply(Active)),
            ("SUBSCRIPTION_CREATED", StatusMapping::Apply(Pending)),
            ("SUBSCRIPTION_UPDATED", StatusMapping::Unchanged),
            ("SUBSCRIPTION_DELETED", StatusMapping::Apply(Canceled)),
            ("SUBSCRIPTION_RENEWED", StatusMapping::Apply(Active)),
            ("SUBSCRIPTION_ACTIVATED", StatusMapping::Unchanged),
            ("SUBSCRIPTION_CANCELED", StatusMapping::Apply(Canceled)),
        ];

        for (name, mapping) in expected {
            assert_eq!(map_event(name), mapping, "event {}", name);
        }
    }

    #[test]
    fn known_events_round_trip_through_names() {
        for event in ProviderEvent::KNOWN.iter() {
            assert_eq!(&ProviderEvent::parse(event.as_str()), event);
            assert!(event.is_known());
        }
    }

    #[test]
    fn unknown_event_is_ignored() {
        assert_eq!(map_event("FOO_BAR"), StatusMapping::Ignore);
        assert_eq!(ProviderEvent::parse("FOO_BAR").as_str(), "FOO_BAR");
    }

    #[test]
    fn lower_case_names_are_not_recognised() {
        assert_eq!(map_event("payment_confirmed"), StatusMapping::Ignore);
    }

    #[test]
    fn forwarding_allow_list() {
        let forwarded: Vec<&str> = ProviderEvent::KNOWN
            .iter()
            .filter(|e| e.is_forwarded())
            .map(|e| e.as_str())
            .collect();

        assert_eq!(
            forwarded,
            vec![
                "PAYMENT_CONFIRMED",
                "PAYMENT_RECEIVED",
                "PAYMENT_OVERDUE",
                "PAYMENT_REFUNDED",
                "SUBSCRIPTION_CREATED",
                "SUBSCRIPTION_RENEWED",
                "SUBSCRIPTION_ACTIVATED",
                "SUBSCRIPTION_CANCELED",
            ]
        );
        assert!(!ProviderEvent::Unknown("X".into()).is_forwarded());
    }

    #[test]
    fn only_payment_arrival_confirms() {
        assert!(ProviderEvent::PaymentConfirmed.confirms_payment());
        assert!(ProviderEvent::PaymentReceived.confirms_payment());
        assert!(ProviderEvent::PaymentDunningReceived.confirms_payment());
        assert!(!ProviderEvent::SubscriptionActivated.confirms_payment());
        assert!(!ProviderEvent::SubscriptionRenewed.confirms_payment());
        assert!(!ProviderEvent::PaymentRestored.confirms_payment());
    }

    proptest! {
        #[test]
        fn unlisted_names_are_always_ignored(name in "[A-Za-z_]{0,32}") {
            let event = ProviderEvent::parse(&name);
            prop_assume!(!event.is_known());
            prop_assert_eq!(map_event(&name), StatusMapping::Ignore);
            prop_assert!(!event.is_forwarded());
        }
    }
}
