//! Asaas billing provider adapters.
//!
//! - `AsaasBillingAdapter` - production REST client
//! - `MockBillingProvider` - configurable test double

mod api_types;
mod asaas_adapter;
mod mock_billing_provider;

pub use asaas_adapter::{AsaasBillingAdapter, AsaasConfig, DEFAULT_BASE_URL};
pub use mock_billing_provider::{MethodCall, MockBillingProvider};
