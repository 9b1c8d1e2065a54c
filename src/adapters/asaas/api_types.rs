//! Asaas REST API wire types.
//!
//! Only the fields this service reads are typed; full objects are kept as
//! `serde_json::Value` where callers need them verbatim.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::billing::{ProviderPaymentStatus, ProviderSubscriptionStatus};
use crate::ports::{
    NewCustomer, NewSubscription, ProviderCustomer, ProviderError, ProviderPayment,
    ProviderSubscription,
};

/// Paginated list envelope.
#[derive(Debug, Deserialize)]
pub struct AsaasList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct AsaasCustomer {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl From<AsaasCustomer> for ProviderCustomer {
    fn from(customer: AsaasCustomer) -> Self {
        ProviderCustomer {
            id: customer.id,
            name: customer.name,
            email: customer.email,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerBody<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub cpf_cnpj: String,
    pub mobile_phone: &'a str,
    pub external_reference: &'a str,
}

impl<'a> From<&'a NewCustomer> for CreateCustomerBody<'a> {
    fn from(request: &'a NewCustomer) -> Self {
        Self {
            name: &request.name,
            email: &request.email,
            // The API rejects formatted documents.
            cpf_cnpj: request.cpf_cnpj.chars().filter(|c| c.is_ascii_digit()).collect(),
            mobile_phone: &request.phone,
            external_reference: &request.external_reference,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionBody<'a> {
    pub customer: &'a str,
    pub billing_type: &'static str,
    pub value: f64,
    pub next_due_date: String,
    pub cycle: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub external_reference: &'a str,
}

impl<'a> From<&'a NewSubscription> for CreateSubscriptionBody<'a> {
    fn from(request: &'a NewSubscription) -> Self {
        Self {
            customer: &request.customer_id,
            billing_type: request.billing_type.as_str(),
            value: request.value.as_decimal(),
            next_due_date: request.next_due_date.format("%Y-%m-%d").to_string(),
            cycle: request.cycle.as_str(),
            description: request.description.as_deref(),
            external_reference: &request.external_reference,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionFields {
    id: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    next_due_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentFields {
    id: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    due_date: Option<String>,
    #[serde(default)]
    invoice_url: Option<String>,
}

/// Decode a raw subscription object, keeping it for pass-through.
pub fn subscription_from_value(raw: Value) -> Result<ProviderSubscription, ProviderError> {
    let fields: SubscriptionFields = serde_json::from_value(raw.clone())
        .map_err(|e| ProviderError::decode(format!("Invalid subscription object: {}", e)))?;

    Ok(ProviderSubscription {
        id: fields.id,
        status: ProviderSubscriptionStatus::parse(fields.status.as_deref().unwrap_or_default()),
        next_due_date: fields.next_due_date.as_deref().and_then(parse_date),
        raw,
    })
}

/// Decode a raw payment object, keeping it for pass-through.
pub fn payment_from_value(raw: Value) -> Result<ProviderPayment, ProviderError> {
    let fields: PaymentFields = serde_json::from_value(raw.clone())
        .map_err(|e| ProviderError::decode(format!("Invalid payment object: {}", e)))?;

    Ok(ProviderPayment {
        id: fields.id,
        status: ProviderPaymentStatus::parse(fields.status.as_deref().unwrap_or_default()),
        due_date: fields.due_date.as_deref().and_then(parse_date),
        invoice_url: fields.invoice_url.filter(|u| !u.is_empty()),
        raw,
    })
}

/// The charge with the latest due date. Ties and undated charges resolve
/// to the one listed last.
pub fn latest_payment(payments: Vec<ProviderPayment>) -> Option<ProviderPayment> {
    payments.into_iter().max_by_key(|p| p.due_date)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}
