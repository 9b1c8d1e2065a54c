//! Rules deciding when a stored status may change.
//!
//! Both the webhook path and the read path share one trust boundary: a
//! `PENDING` row only becomes `ACTIVE` on proof of payment, and never moves
//! anywhere else from the read path.

use super::{ProviderEvent, ProviderPaymentStatus, ProviderSubscriptionStatus, StatusMapping};
use super::SubscriptionStatus;

/// Target status for a webhook event against a row in `current`.
///
/// `None` means no write: the event does not change status, the row
/// already holds the target, or the event is not trusted to promote a
/// pending row.
pub fn webhook_target(
    current: SubscriptionStatus,
    event: &ProviderEvent,
) -> Option<SubscriptionStatus> {
    let target = match event.mapping() {
        StatusMapping::Apply(target) => target,
        StatusMapping::Unchanged | StatusMapping::Ignore => return None,
    };

    if target == current {
        return None;
    }

    if current == SubscriptionStatus::Pending
        && target == SubscriptionStatus::Active
        && !event.confirms_payment()
    {
        return None;
    }

    Some(target)
}

/// Target status after comparing the stored row with the provider's live
/// subscription status.
pub fn live_status_target(
    current: SubscriptionStatus,
    live: &ProviderSubscriptionStatus,
) -> Option<SubscriptionStatus> {
    let live = live.as_local()?;

    if live == current {
        return None;
    }

    if current == SubscriptionStatus::Pending && live != SubscriptionStatus::Active {
        return None;
    }

    // A canceled row is only reopened by a live ACTIVE.
    if current == SubscriptionStatus::Canceled && live != SubscriptionStatus::Active {
        return None;
    }

    Some(live)
}

/// Whether the latest charge forces an active row down to `OVERDUE`.
pub fn should_demote_to_overdue(
    current: SubscriptionStatus,
    latest_payment: &ProviderPaymentStatus,
) -> bool {
    current == SubscriptionStatus::Active && latest_payment.is_overdue()
}
