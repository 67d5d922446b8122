//! Validation utilities for the Survey Equipment Ledger

use chrono::NaiveDate;
use rust_decimal::Decimal;

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') =>
        {
            Ok(())
        }
        _ => Err("Invalid email format"),
    }
}

/// Normalize an email for lookup: trimmed, domain lowercased
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Validate a money amount is not negative
pub fn validate_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Amount cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Catalog Validations
// ============================================================================

/// Width of `tools.code`
pub const TOOL_CODE_MAX_LEN: usize = 64;

/// Width of `sale_items.serial_number`
pub const SERIAL_MAX_LEN: usize = 100;

/// Validate tool code format (1-64 characters, letters, digits, '-', '_', '/')
pub fn validate_tool_code(code: &str) -> Result<(), &'static str> {
    if code.trim().is_empty() {
        return Err("Tool code is required");
    }
    if code.chars().count() > TOOL_CODE_MAX_LEN {
        return Err("Tool code must be at most 64 characters");
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/'))
    {
        return Err("Tool code may only contain letters, digits, '-', '_' and '/'");
    }
    Ok(())
}

/// Validate a batch of serial numbers: non-blank, at most 100 characters,
/// and free of duplicates
pub fn validate_serials(serials: &[String]) -> Result<(), &'static str> {
    let mut seen = std::collections::HashSet::new();
    for serial in serials {
        if serial.trim().is_empty() {
            return Err("Serial numbers cannot be blank");
        }
        if serial.chars().count() > SERIAL_MAX_LEN {
            return Err("Serial numbers must be at most 100 characters");
        }
        if !seen.insert(serial.as_str()) {
            return Err("Serial numbers must be unique");
        }
    }
    Ok(())
}

/// Validate an expiry date is not already in the past
pub fn validate_expiry_date(expiry: NaiveDate, today: NaiveDate) -> Result<(), &'static str> {
    if expiry < today {
        return Err("Expiry date cannot be in the past");
    }
    Ok(())
}

// ============================================================================
// Nigeria-Specific Validations
// ============================================================================

/// Validate Nigerian phone number format
/// Accepts: 08031234567, 0803 123 4567, +2348031234567
pub fn validate_nigerian_phone(phone: &str) -> Result<(), &'static str> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    // Local: 11 digits starting with 0
    if digits.len() == 11 && digits.starts_with('0') {
        return Ok(());
    }

    // International: 234 + 10 digits
    if digits.len() == 13 && digits.starts_with("234") {
        return Ok(());
    }

    Err("Invalid phone number format")
}

/// The ten subscriber digits of a Nigerian phone number, without the
/// leading `0` or `234`
pub fn nigerian_subscriber_number(phone: &str) -> Option<String> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() == 11 {
        digits.strip_prefix('0').map(str::to_string)
    } else if digits.len() == 13 {
        digits.strip_prefix("234").map(str::to_string)
    } else {
        None
    }
}

/// Whether two phone numbers, in any accepted format, reach the same line
pub fn same_nigerian_phone(a: &str, b: &str) -> bool {
    match (nigerian_subscriber_number(a), nigerian_subscriber_number(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("ada@example").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ada.example.com").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "Ada@example.com");
    }

    #[test]
    fn test_validate_tool_code() {
        assert!(validate_tool_code("HT-V30").is_ok());
        assert!(validate_tool_code("TS/16_A").is_ok());
        assert!(validate_tool_code("").is_err());
        assert!(validate_tool_code("has space").is_err());
    }

    #[test]
    fn test_tool_code_fits_column() {
        assert!(validate_tool_code(&"A".repeat(TOOL_CODE_MAX_LEN)).is_ok());
        assert!(validate_tool_code(&"A".repeat(TOOL_CODE_MAX_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_serials() {
        assert!(validate_serials(&["A1".into(), "A2".into()]).is_ok());
        assert!(validate_serials(&["A1".into(), "A1".into()]).is_err());
        assert!(validate_serials(&[" ".into()]).is_err());
        assert!(validate_serials(&["S".repeat(SERIAL_MAX_LEN)]).is_ok());
        assert!(validate_serials(&["S".repeat(SERIAL_MAX_LEN + 1)]).is_err());
    }

    #[test]
    fn test_validate_expiry_date() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert!(validate_expiry_date(today, today).is_ok());
        assert!(validate_expiry_date(today.pred_opt().unwrap(), today).is_err());
    }

    #[test]
    fn test_validate_nigerian_phone() {
        assert!(validate_nigerian_phone("08031234567").is_ok());
        assert!(validate_nigerian_phone("0803 123 4567").is_ok());
        assert!(validate_nigerian_phone("+2348031234567").is_ok());
        assert!(validate_nigerian_phone("12345").is_err());
    }

    #[test]
    fn test_same_nigerian_phone() {
        assert!(same_nigerian_phone("08031234567", "+234 803 123 4567"));
        assert!(same_nigerian_phone("0803 123 4567", "08031234567"));
        assert!(!same_nigerian_phone("08031234567", "08031234568"));
        assert!(!same_nigerian_phone("12345", "12345"));
    }
}
