//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `asaas` - Billing provider REST client (and mock)
//! - `auth` - Bearer token validation
//! - `http` - Axum routers, DTOs and middleware
//! - `memory` - In-memory storage for tests and local runs
//! - `notifier` - Automation endpoint delivery
//! - `postgres` - PostgreSQL storage

pub mod asaas;
pub mod auth;
pub mod http;
pub mod memory;
pub mod notifier;
pub mod postgres;
