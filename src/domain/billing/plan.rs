//! Plan terms: billing cycle, payment method and price.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// How often the provider charges the clinic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "MONTHLY",
            BillingCycle::Yearly => "YEARLY",
        }
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillingCycle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MONTHLY" => Ok(BillingCycle::Monthly),
            "YEARLY" => Ok(BillingCycle::Yearly),
            other => Err(ValidationError::invalid_format(
                "cycle",
                format!("unknown billing cycle '{}'", other),
            )),
        }
    }
}

/// Payment method offered to the clinic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingType {
    Boleto,
    CreditCard,
    Pix,
}

impl BillingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingType::Boleto => "BOLETO",
            BillingType::CreditCard => "CREDIT_CARD",
            BillingType::Pix => "PIX",
        }
    }
}

impl fmt::Display for BillingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillingType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BOLETO" => Ok(BillingType::Boleto),
            "CREDIT_CARD" => Ok(BillingType::CreditCard),
            "PIX" => Ok(BillingType::Pix),
            other => Err(ValidationError::invalid_format(
                "billing_type",
                format!("unknown billing type '{}'", other),
            )),
        }
    }
}

/// Plan price in integer cents.
///
/// The provider and the HTTP API speak decimal amounts; conversion happens
/// at the edges so arithmetic and storage never touch floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlanValue(i64);

impl PlanValue {
    /// Largest storable amount, matching the `NUMERIC(12,2)` column.
    pub const MAX_CENTS: i64 = 999_999_999_999;

    /// Builds a value from cents. Must be strictly positive and storable.
    pub fn from_cents(cents: i64) -> Result<Self, ValidationError> {
        if cents <= 0 {
            return Err(ValidationError::not_positive("value"));
        }
        if cents > Self::MAX_CENTS {
            return Err(Self::too_large());
        }
        Ok(Self(cents))
    }

    /// Builds a value from a decimal amount, rounding to the nearest cent.
    pub fn from_decimal(amount: f64) -> Result<Self, ValidationError> {
        if !amount.is_finite() {
            return Err(ValidationError::invalid_format("value", "not a finite number"));
        }
        let cents = (amount * 100.0).round();
        // Checked before the cast, which saturates.
        if cents > Self::MAX_CENTS as f64 {
            return Err(Self::too_large());
        }
        Self::from_cents(cents as i64)
    }

    fn too_large() -> ValidationError {
        ValidationError::too_large("value", "9999999999.99")
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    /// Decimal amount as sent to the provider.
    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for PlanValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for PlanValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_decimal())
    }
}

impl<'de> Deserialize<'de> for PlanValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        PlanValue::from_decimal(amount).map_err(serde::de::Error::custom)
    }
}
