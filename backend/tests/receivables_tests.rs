//! Tests for the installment receivables ledger
//!
//! Covers the derived fields recomputed on every customer save:
//! amount left, payment progress, and the receivable status machine.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{amount_left, payment_progress, InstallmentPlan, ReceivableStatus};

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

fn plan(total: &str, paid: &str, next: Option<NaiveDate>) -> InstallmentPlan {
    InstallmentPlan {
        total_selling_price: dec(total),
        amount_paid: dec(paid),
        date_next_installment: next,
    }
}

// =============================================================================
// Balance and progress
// =============================================================================

mod balance {
    use super::*;

    #[test]
    fn partial_payment() {
        let snapshot = plan("1000", "400", None).snapshot(today());
        assert_eq!(snapshot.amount_left, dec("600"));
        assert_eq!(snapshot.progress, dec("40"));
        assert_eq!(snapshot.status, ReceivableStatus::OnTrack);
    }

    #[test]
    fn progress_rounds_to_two_places() {
        assert_eq!(payment_progress(dec("3"), dec("1")), dec("33.33"));
        assert_eq!(payment_progress(dec("3"), dec("2")), dec("66.67"));
    }

    #[test]
    fn overpayment_caps_progress_at_hundred() {
        assert_eq!(payment_progress(dec("500"), dec("750")), dec("100"));
        assert_eq!(amount_left(dec("500"), dec("750")), dec("-250"));
    }

    #[test]
    fn zero_total_counts_as_complete() {
        let snapshot = plan("0", "0", None).snapshot(today());
        assert_eq!(snapshot.progress, dec("100"));
        assert_eq!(snapshot.status, ReceivableStatus::FullyPaid);
    }
}

// =============================================================================
// Status machine
// =============================================================================

mod status {
    use super::*;

    #[test]
    fn missed_installment_is_overdue() {
        let yesterday = today().pred_opt().unwrap();
        let snapshot = plan("1000", "100", Some(yesterday)).snapshot(today());
        assert_eq!(snapshot.status, ReceivableStatus::Overdue);
    }

    #[test]
    fn installment_in_three_days_is_due_soon() {
        let soon = today().checked_add_days(Days::new(3)).unwrap();
        let snapshot = plan("1000", "100", Some(soon)).snapshot(today());
        assert_eq!(snapshot.status, ReceivableStatus::DueSoon);
    }

    #[test]
    fn installment_today_is_due_soon() {
        let snapshot = plan("1000", "100", Some(today())).snapshot(today());
        assert_eq!(snapshot.status, ReceivableStatus::DueSoon);
    }

    #[test]
    fn installment_next_month_is_on_track() {
        let later = today().checked_add_days(Days::new(30)).unwrap();
        let snapshot = plan("1000", "100", Some(later)).snapshot(today());
        assert_eq!(snapshot.status, ReceivableStatus::OnTrack);
    }

    #[test]
    fn settled_plan_is_fully_paid_even_when_past_due() {
        let long_ago = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let snapshot = plan("1000", "1000", Some(long_ago)).snapshot(today());
        assert_eq!(snapshot.amount_left, Decimal::ZERO);
        assert_eq!(snapshot.status, ReceivableStatus::FullyPaid);
    }

    #[test]
    fn status_serializes_kebab_case() {
        let json = serde_json::to_string(&ReceivableStatus::DueSoon).unwrap();
        assert_eq!(json, "\"due-soon\"");
        assert_eq!(ReceivableStatus::FullyPaid.as_str(), "fully-paid");
    }
}

// =============================================================================
// Properties
// =============================================================================

fn money_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Progress always lands in 0..=100
    #[test]
    fn prop_progress_is_bounded(total in money_strategy(), paid in money_strategy()) {
        let progress = payment_progress(total, paid);
        prop_assert!(progress >= Decimal::ZERO);
        prop_assert!(progress <= Decimal::ONE_HUNDRED);
    }

    /// Amount left plus amount paid is always the selling price
    #[test]
    fn prop_balance_reconciles(total in money_strategy(), paid in money_strategy()) {
        prop_assert_eq!(amount_left(total, paid) + paid, total);
    }

    /// Nothing left to pay means fully paid, whatever the schedule
    #[test]
    fn prop_settled_is_fully_paid(
        total in money_strategy(),
        extra in money_strategy(),
        offset in -60i64..60,
    ) {
        let due = if offset < 0 {
            today().checked_sub_days(Days::new(offset.unsigned_abs()))
        } else {
            today().checked_add_days(Days::new(offset as u64))
        };
        let snapshot = InstallmentPlan {
            total_selling_price: total,
            amount_paid: total + extra,
            date_next_installment: due,
        }
        .snapshot(today());
        prop_assert_eq!(snapshot.status, ReceivableStatus::FullyPaid);
    }

    /// An open balance is never reported fully paid
    #[test]
    fn prop_open_balance_is_not_fully_paid(
        paid in money_strategy(),
        owed in 1i64..1_000_000,
        offset in 0u64..60,
    ) {
        let total = paid + Decimal::new(owed, 2);
        let due = today().checked_add_days(Days::new(offset));
        let snapshot = InstallmentPlan {
            total_selling_price: total,
            amount_paid: paid,
            date_next_installment: due,
        }
        .snapshot(today());
        prop_assert_ne!(snapshot.status, ReceivableStatus::FullyPaid);
        if offset <= 7 {
            prop_assert_eq!(snapshot.status, ReceivableStatus::DueSoon);
        } else {
            prop_assert_eq!(snapshot.status, ReceivableStatus::OnTrack);
        }
    }
}
