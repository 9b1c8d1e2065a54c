//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, time, auth, errors)
//! - `billing` - Subscription status, provider events, reconciliation rules

pub mod billing;
pub mod foundation;
