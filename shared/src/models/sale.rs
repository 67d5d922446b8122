//! Sales ledger models and invoice numbering

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix of every generated invoice number
pub const INVOICE_PREFIX: &str = "INV-";

/// Number of random characters after the invoice prefix
pub const INVOICE_SUFFIX_LEN: usize = 6;

/// Width of `sales.invoice_number`
pub const INVOICE_NUMBER_MAX_LEN: usize = 32;

pub(crate) const ALPHANUMERIC_UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Settlement state of a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "sale_payment_status", rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Installment,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Installment => "installment",
            PaymentStatus::Failed => "failed",
        }
    }

    /// Initial status of a new sale
    pub fn for_new_sale(payment_plan: Option<&str>) -> Self {
        match payment_plan.map(str::trim) {
            Some(plan) if !plan.is_empty() => PaymentStatus::Installment,
            _ => PaymentStatus::Pending,
        }
    }
}

/// A sales transaction header
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: i64,
    pub staff_id: i64,
    pub name: String,
    pub phone: String,
    pub state: Option<String>,
    pub total_cost: Decimal,
    pub date_sold: NaiveDate,
    pub invoice_number: String,
    pub payment_plan: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub payment_status: PaymentStatus,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<SaleItem>,
}

/// A line item of a sale, one unit of a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    pub tool_id: Uuid,
    pub equipment: String,
    pub cost: Decimal,
    pub category: Option<String>,
    pub serial_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Generate a random `INV-XXXXXX` invoice number.
///
/// Uniqueness is the store's job; callers regenerate on collision.
pub fn generate_invoice_number<R: Rng>(rng: &mut R) -> String {
    let suffix: String = (0..INVOICE_SUFFIX_LEN)
        .map(|_| ALPHANUMERIC_UPPER[rng.gen_range(0..ALPHANUMERIC_UPPER.len())] as char)
        .collect();
    format!("{}{}", INVOICE_PREFIX, suffix)
}

/// Whether `value` has the `INV-[A-Z0-9]{6}` shape
pub fn is_valid_invoice_number(value: &str) -> bool {
    match value.strip_prefix(INVOICE_PREFIX) {
        Some(suffix) => {
            suffix.len() == INVOICE_SUFFIX_LEN
                && suffix
                    .bytes()
                    .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        }
        None => false,
    }
}

/// Sum of line item costs
pub fn items_total<'a, I>(costs: I) -> Decimal
where
    I: IntoIterator<Item = &'a Decimal>,
{
    costs.into_iter().sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn generated_invoice_numbers_are_well_formed() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let invoice = generate_invoice_number(&mut rng);
            assert!(is_valid_invoice_number(&invoice), "{}", invoice);
        }
    }

    #[test]
    fn malformed_invoice_numbers_are_rejected() {
        assert!(!is_valid_invoice_number("INV-abc123"));
        assert!(!is_valid_invoice_number("INV-ABC12"));
        assert!(!is_valid_invoice_number("INV-ABC1234"));
        assert!(!is_valid_invoice_number("INX-ABC123"));
        assert!(!is_valid_invoice_number("INV-ABC-12"));
    }

    #[test]
    fn payment_plan_marks_sale_as_installment() {
        assert_eq!(PaymentStatus::for_new_sale(Some("6 months")), PaymentStatus::Installment);
        assert_eq!(PaymentStatus::for_new_sale(Some("  ")), PaymentStatus::Pending);
        assert_eq!(PaymentStatus::for_new_sale(None), PaymentStatus::Pending);
    }
}
