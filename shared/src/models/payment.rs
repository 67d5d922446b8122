//! Payment records

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::sale::{PaymentStatus, ALPHANUMERIC_UPPER};

/// Prefix of generated payment references
pub const PAYMENT_REFERENCE_PREFIX: &str = "PSK-";

/// Number of random characters after the reference prefix
pub const PAYMENT_REFERENCE_LEN: usize = 10;

/// How a payment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "payment_method", rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Transfer,
    Card,
    Paystack,
}

/// State of a single payment record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "payment_record_status", rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentRecordStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl PaymentRecordStatus {
    /// Payments are confirmed as soon as they are recorded
    pub fn on_record() -> Self {
        PaymentRecordStatus::Completed
    }

    /// Status a linked sale takes once this payment is recorded
    pub fn sale_status(&self) -> Option<PaymentStatus> {
        match self {
            PaymentRecordStatus::Completed => Some(PaymentStatus::Completed),
            PaymentRecordStatus::Failed => Some(PaymentStatus::Failed),
            PaymentRecordStatus::Pending => None,
        }
    }
}

/// A payment against a sale
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: i64,
    /// Account that made the payment
    pub customer_id: i64,
    pub sale_id: Option<i64>,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_reference: String,
    pub payment_date: DateTime<Utc>,
    pub status: PaymentRecordStatus,
}

/// Generate a `PSK-XXXXXXXXXX` payment reference
pub fn generate_payment_reference<R: Rng>(rng: &mut R) -> String {
    let suffix: String = (0..PAYMENT_REFERENCE_LEN)
        .map(|_| ALPHANUMERIC_UPPER[rng.gen_range(0..ALPHANUMERIC_UPPER.len())] as char)
        .collect();
    format!("{}{}", PAYMENT_REFERENCE_PREFIX, suffix)
}
