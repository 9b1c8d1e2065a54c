//! Automation endpoint notifiers.

mod http_notifier;
mod recording_notifier;

pub use http_notifier::HttpAutomationNotifier;
pub use recording_notifier::{Delivery, RecordingNotifier};
