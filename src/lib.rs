//! Clinic Billing - subscription lifecycle and billing reconciliation.
//!
//! Ingests billing provider webhooks, originates subscriptions for clinics,
//! and reconciles stored status against the provider on read.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
