//! Browser-side checks run under wasm-bindgen-test

#![cfg(target_arch = "wasm32")]

use survey_equipment_ledger_wasm::{
    calculate_amount_left, calculate_payment_progress, check_invoice_number, check_phone,
    check_serial_batch, preview_receivable_status, serial_set_units,
};
use wasm_bindgen_test::*;

#[wasm_bindgen_test]
fn receivable_preview_matches_backend_rules() {
    let status =
        preview_receivable_status("50000", "20000", Some("2025-06-20".into()), "2025-06-15")
            .unwrap();
    assert_eq!(status, "due-soon");

    let status = preview_receivable_status("50000", "0", None, "2025-06-15").unwrap();
    assert_eq!(status, "on-track");
}

#[wasm_bindgen_test]
fn progress_and_balance() {
    assert_eq!(calculate_payment_progress("50000", "12500").unwrap(), "25");
    assert_eq!(calculate_amount_left("50000", "12500").unwrap(), "37500");
    assert!(calculate_payment_progress("abc", "1").is_err());
}

#[wasm_bindgen_test]
fn form_checks() {
    assert!(check_invoice_number("INV-A1B2C3"));
    assert!(!check_invoice_number("A1B2C3"));
    assert_eq!(serial_set_units("single"), Some(1));
    assert!(check_phone("08031234567"));
    assert!(check_serial_batch(r#"["A1", "A1"]"#).is_err());
}
