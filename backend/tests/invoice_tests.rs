//! Tests for invoice numbering, sale totals, and payment confirmation

use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use rust_decimal::Decimal;
use shared::{
    generate_invoice_number, generate_payment_reference, is_valid_invoice_number, items_total,
    PaymentRecordStatus, PaymentStatus, INVOICE_PREFIX,
};

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

// =============================================================================
// Invoice numbers
// =============================================================================

mod invoice_numbers {
    use super::*;

    #[test]
    fn generated_numbers_match_format() {
        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..500 {
            let invoice = generate_invoice_number(&mut rng);
            assert!(invoice.starts_with(INVOICE_PREFIX));
            assert_eq!(invoice.len(), 10);
            assert!(is_valid_invoice_number(&invoice), "bad invoice {}", invoice);
        }
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        assert!(is_valid_invoice_number("INV-A1B2C3"));
        assert!(!is_valid_invoice_number("INV-a1b2c3"));
        assert!(!is_valid_invoice_number("INV-A1B2C"));
        assert!(!is_valid_invoice_number("INV-A1B2C3D"));
        assert!(!is_valid_invoice_number("INX-A1B2C3"));
        assert!(!is_valid_invoice_number("INV-A1B2C!"));
    }

    #[test]
    fn different_seeds_rarely_collide() {
        let a = generate_invoice_number(&mut StdRng::seed_from_u64(1));
        let b = generate_invoice_number(&mut StdRng::seed_from_u64(2));
        assert_ne!(a, b);
    }
}

// =============================================================================
// Sale totals and status
// =============================================================================

mod sale_status {
    use super::*;

    #[test]
    fn total_defaults_to_item_sum() {
        let costs = [dec("450000.00"), dec("120000.50"), dec("9999.50")];
        assert_eq!(items_total(costs.iter()), dec("580000.00"));
    }

    #[test]
    fn empty_sale_totals_zero() {
        let costs: [Decimal; 0] = [];
        assert_eq!(items_total(costs.iter()), Decimal::ZERO);
    }

    #[test]
    fn payment_plan_starts_installment() {
        assert_eq!(
            PaymentStatus::for_new_sale(Some("3 months")),
            PaymentStatus::Installment
        );
        assert_eq!(PaymentStatus::for_new_sale(Some("  ")), PaymentStatus::Pending);
        assert_eq!(PaymentStatus::for_new_sale(None), PaymentStatus::Pending);
    }

    #[test]
    fn recorded_payment_completes_pending_sale() {
        let sale_status = PaymentStatus::Pending;
        let payment = PaymentRecordStatus::on_record();
        let next = payment.sale_status().unwrap_or(sale_status);
        assert_eq!(next, PaymentStatus::Completed);
    }

    #[test]
    fn failed_payment_marks_sale_failed() {
        assert_eq!(
            PaymentRecordStatus::Failed.sale_status(),
            Some(PaymentStatus::Failed)
        );
    }
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_invoice_format(seed in any::<u64>()) {
        let invoice = generate_invoice_number(&mut StdRng::seed_from_u64(seed));
        prop_assert!(is_valid_invoice_number(&invoice));
    }

    #[test]
    fn prop_payment_reference_format(seed in any::<u64>()) {
        let reference = generate_payment_reference(&mut StdRng::seed_from_u64(seed));
        prop_assert!(reference.starts_with("PSK-"));
        prop_assert_eq!(reference.len(), 14);
        prop_assert!(reference[4..]
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
    }

    /// The item sum does not depend on line order
    #[test]
    fn prop_item_total_order_independent(
        mut cents in prop::collection::vec(0i64..100_000_000, 0..20)
    ) {
        let forward: Vec<Decimal> = cents.iter().map(|c| Decimal::new(*c, 2)).collect();
        cents.reverse();
        let backward: Vec<Decimal> = cents.iter().map(|c| Decimal::new(*c, 2)).collect();
        prop_assert_eq!(items_total(forward.iter()), items_total(backward.iter()));
    }
}
