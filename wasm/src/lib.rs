//! WebAssembly module for the Survey Equipment Ledger
//!
//! Provides client-side computation for:
//! - Receivable status and payment progress previews
//! - Invoice number and serial batch checks
//! - Offline form validation

use chrono::NaiveDate;
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

fn parse_decimal(field: &str, value: &str) -> Result<Decimal, JsValue> {
    value
        .trim()
        .parse()
        .map_err(|e| JsValue::from_str(&format!("Invalid {}: {}", field, e)))
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, JsValue> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| JsValue::from_str(&format!("Invalid {}: {}", field, e)))
}

/// Preview the receivable status a customer will get on save
#[wasm_bindgen]
pub fn preview_receivable_status(
    total_selling_price: &str,
    amount_paid: &str,
    date_next_installment: Option<String>,
    today: &str,
) -> Result<String, JsValue> {
    let plan = InstallmentPlan {
        total_selling_price: parse_decimal("total_selling_price", total_selling_price)?,
        amount_paid: parse_decimal("amount_paid", amount_paid)?,
        date_next_installment: date_next_installment
            .as_deref()
            .map(|d| parse_date("date_next_installment", d))
            .transpose()?,
    };
    let today = parse_date("today", today)?;

    Ok(plan.snapshot(today).status.as_str().to_string())
}

/// Payment progress percentage (0 to 100, two decimal places)
#[wasm_bindgen]
pub fn calculate_payment_progress(
    total_selling_price: &str,
    amount_paid: &str,
) -> Result<String, JsValue> {
    let total = parse_decimal("total_selling_price", total_selling_price)?;
    let paid = parse_decimal("amount_paid", amount_paid)?;
    Ok(payment_progress(total, paid).normalize().to_string())
}

/// Outstanding balance on an installment plan
#[wasm_bindgen]
pub fn calculate_amount_left(
    total_selling_price: &str,
    amount_paid: &str,
) -> Result<String, JsValue> {
    let total = parse_decimal("total_selling_price", total_selling_price)?;
    let paid = parse_decimal("amount_paid", amount_paid)?;
    Ok(amount_left(total, paid).to_string())
}

/// Check a typed invoice number has the `INV-XXXXXX` shape
#[wasm_bindgen]
pub fn check_invoice_number(value: &str) -> bool {
    is_valid_invoice_number(value.trim())
}

/// Number of serials sold together for a set size name
#[wasm_bindgen]
pub fn serial_set_units(set_size: &str) -> Option<u32> {
    let size: SetSize =
        serde_json::from_value(serde_json::Value::String(set_size.to_string())).ok()?;
    Some(size.units() as u32)
}

/// Validate a restock batch of serials given as a JSON array
#[wasm_bindgen]
pub fn check_serial_batch(serials_json: &str) -> Result<usize, JsValue> {
    let serials: Vec<String> = serde_json::from_str(serials_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid serials JSON: {}", e)))?;
    validate_serials(&serials).map_err(JsValue::from_str)?;
    Ok(serials.len())
}

/// Validate a customer phone number
#[wasm_bindgen]
pub fn check_phone(phone: &str) -> bool {
    validate_nigerian_phone(phone).is_ok()
}

/// Validate an account email address
#[wasm_bindgen]
pub fn check_email(email: &str) -> bool {
    validate_email(email).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receivable_preview() {
        let status =
            preview_receivable_status("1000", "400", Some("2025-06-14".into()), "2025-06-15")
                .unwrap();
        assert_eq!(status, "overdue");

        let status = preview_receivable_status("1000", "1000", None, "2025-06-15").unwrap();
        assert_eq!(status, "fully-paid");
    }

    #[test]
    fn test_payment_progress() {
        assert_eq!(calculate_payment_progress("1000", "400").unwrap(), "40");
        assert_eq!(calculate_amount_left("1000", "400").unwrap(), "600");
    }

    #[test]
    fn test_invoice_number() {
        assert!(check_invoice_number("INV-4K9Z2A"));
        assert!(!check_invoice_number("INV-4k9z2a"));
    }

    #[test]
    fn test_serial_set_units() {
        assert_eq!(serial_set_units("pair"), Some(2));
        assert_eq!(serial_set_units("quad"), Some(4));
        assert_eq!(serial_set_units("dozen"), None);
    }

    #[test]
    fn test_serial_batch() {
        assert_eq!(check_serial_batch(r#"["A1", "A2", "A3"]"#).unwrap(), 3);
    }

    #[test]
    fn test_contact_checks() {
        assert!(check_phone("0803 123 4567"));
        assert!(check_phone("+2348031234567"));
        assert!(!check_phone("12345"));
        assert!(check_email("ada@example.com"));
    }
}
