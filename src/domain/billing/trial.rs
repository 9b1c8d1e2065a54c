//! Free trial window for clinics without a subscription.

use chrono::Duration;
use serde::Serialize;

use crate::domain::foundation::Timestamp;

/// Length of the free trial, counted from clinic creation.
pub const TRIAL_DAYS: i64 = 15;

/// Trial state returned in place of a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialStatus {
    pub trial_end_date: Timestamp,
    pub days_left: i64,
}

/// Computes the trial status at `now` for a clinic created at `created_at`.
///
/// Returns `None` once the window has closed. `days_left` rounds partial
/// days up, so the last day of the trial reports 1.
pub fn trial_status(created_at: Timestamp, now: Timestamp) -> Option<TrialStatus> {
    let end = created_at.add_days(TRIAL_DAYS);
    if !now.is_before(&end) {
        return None;
    }

    let remaining = end.duration_since(&now);
    Some(TrialStatus {
        trial_end_date: end,
        days_left: ceil_days(remaining),
    })
}

fn ceil_days(remaining: Duration) -> i64 {
    let whole = remaining.num_days();
    if remaining > Duration::days(whole) {
        whole + 1
    } else {
        whole
    }
}
