//! Tests for stock and serial pool bookkeeping
//!
//! Selling, releasing, and allocating units must keep stock non-negative
//! and keep every serial in exactly one of the available or sold lists.

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use rust_decimal::Decimal;
use shared::{InventoryError, SerialSaleContext, SetSize, Tool, ToolStatus};
use uuid::Uuid;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

fn tool_with(stock: i32, serials: &[String], set_size: SetSize) -> Tool {
    Tool {
        id: Uuid::new_v4(),
        name: "South Galaxy G1".to_string(),
        code: "SG-G1".to_string(),
        category: "Receiver".to_string(),
        description: "GNSS receiver".to_string(),
        cost: Decimal::new(1_250_000, 0),
        stock,
        status: ToolStatus::Available,
        is_enabled: true,
        supplier_id: None,
        equipment_type_id: None,
        invoice_number: None,
        set_size,
        date_added: Utc::now(),
        expiry_date: None,
        available_serials: serials.to_vec(),
        sold_serials: Vec::new(),
    }
}

fn serials(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("SN{:04}", i)).collect()
}

fn sale_context() -> SerialSaleContext {
    SerialSaleContext {
        sale_id: Some(42),
        customer_name: Some("Bola Adeyemi".to_string()),
        invoice_number: Some("INV-7QX2KD".to_string()),
        date_sold: None,
    }
}

// =============================================================================
// Selling line items
// =============================================================================

mod selling {
    use super::*;

    #[test]
    fn last_unit_then_out_of_stock() {
        let mut tool = tool_with(1, &[], SetSize::Single);
        tool.sell_unit(None, &sale_context(), today()).unwrap();
        assert_eq!(tool.stock, 0);

        let err = tool.sell_unit(None, &sale_context(), today()).unwrap_err();
        assert!(matches!(err, InventoryError::OutOfStock { .. }));
        assert_eq!(tool.stock, 0);
    }

    #[test]
    fn named_serial_records_sale_metadata() {
        let mut tool = tool_with(3, &serials(3), SetSize::Single);
        tool.sell_unit(Some("SN0002"), &sale_context(), today()).unwrap();

        let sold = &tool.sold_serials[0];
        assert_eq!(sold.serial, "SN0002");
        assert_eq!(sold.sale_id, Some(42));
        assert_eq!(sold.customer_name.as_deref(), Some("Bola Adeyemi"));
        assert_eq!(sold.invoice_number.as_deref(), Some("INV-7QX2KD"));
        assert_eq!(sold.date_sold, today());
        assert!(!tool.available_serials.contains(&"SN0002".to_string()));
    }

    #[test]
    fn serial_sold_twice_is_rejected() {
        let mut tool = tool_with(3, &serials(3), SetSize::Single);
        tool.sell_unit(Some("SN0001"), &sale_context(), today()).unwrap();
        let err = tool
            .sell_unit(Some("SN0001"), &sale_context(), today())
            .unwrap_err();
        assert!(matches!(err, InventoryError::SerialUnavailable { .. }));
        assert_eq!(tool.stock, 2);
    }

    #[test]
    fn unserialized_sale_leaves_pool_alone() {
        let mut tool = tool_with(5, &serials(2), SetSize::Single);
        tool.sell_unit(None, &sale_context(), today()).unwrap();
        assert_eq!(tool.stock, 4);
        assert_eq!(tool.available_serials.len(), 2);
        assert!(tool.sold_serials.is_empty());
    }

    #[test]
    fn releasing_unknown_serial_fails() {
        let mut tool = tool_with(1, &serials(1), SetSize::Single);
        let err = tool.release_unit(Some("SN9999")).unwrap_err();
        assert!(matches!(err, InventoryError::SerialNotSold { .. }));
        assert_eq!(tool.stock, 1);
    }
}

// =============================================================================
// Random and set allocation
// =============================================================================

mod allocation {
    use super::*;

    #[test]
    fn random_serial_from_empty_pool_is_none() {
        let mut tool = tool_with(4, &[], SetSize::Single);
        let mut rng = StdRng::seed_from_u64(7);
        assert!(tool
            .take_random_serial(&mut rng, &sale_context(), today())
            .is_none());
        assert_eq!(tool.stock, 4);
    }

    #[test]
    fn random_serial_comes_from_pool() {
        let pool = serials(5);
        let mut tool = tool_with(5, &pool, SetSize::Single);
        let mut rng = StdRng::seed_from_u64(11);
        let serial = tool
            .take_random_serial(&mut rng, &sale_context(), today())
            .unwrap();
        assert!(pool.contains(&serial));
        assert_eq!(tool.sold_serials.len(), 1);
        assert_eq!(tool.available_serials.len(), 4);
    }

    #[test]
    fn pair_set_takes_two_consecutive() {
        let mut tool = tool_with(4, &serials(4), SetSize::Pair);
        let mut rng = StdRng::seed_from_u64(5);
        let set = tool
            .take_serial_set(&mut rng, &sale_context(), today())
            .unwrap();
        assert_eq!(set.len(), 2);

        let pool = serials(4);
        let start = pool.iter().position(|s| s == &set[0]).unwrap();
        assert_eq!(&pool[start..start + 2], set.as_slice());
    }

    #[test]
    fn set_size_units() {
        assert_eq!(SetSize::Single.units(), 1);
        assert_eq!(SetSize::Pair.units(), 2);
        assert_eq!(SetSize::Quad.units(), 4);
    }

    #[test]
    fn restocking_rejects_serial_already_sold() {
        let mut tool = tool_with(1, &serials(1), SetSize::Single);
        tool.sell_unit(Some("SN0001"), &sale_context(), today()).unwrap();
        let err = tool.add_serials(vec!["SN0001".to_string()]).unwrap_err();
        assert!(matches!(err, InventoryError::DuplicateSerial { .. }));
    }
}

// =============================================================================
// Properties
// =============================================================================

fn set_size_strategy() -> impl Strategy<Value = SetSize> {
    prop_oneof![Just(SetSize::Single), Just(SetSize::Pair), Just(SetSize::Quad)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Stock never goes negative no matter how many sales are attempted
    #[test]
    fn prop_stock_never_negative(initial in 0i32..20, attempts in 0usize..40) {
        let mut tool = tool_with(initial, &[], SetSize::Single);
        let mut sold = 0;
        for _ in 0..attempts {
            if tool.sell_unit(None, &sale_context(), today()).is_ok() {
                sold += 1;
            }
            prop_assert!(tool.stock >= 0);
        }
        prop_assert_eq!(sold, attempts.min(initial as usize));
    }

    /// Allocation moves serials between lists without losing any
    #[test]
    fn prop_serial_count_is_preserved(
        pool_size in 0usize..30,
        draws in 0usize..40,
        seed in any::<u64>(),
        set_size in set_size_strategy(),
    ) {
        let mut tool = tool_with(pool_size as i32, &serials(pool_size), set_size);
        let mut rng = StdRng::seed_from_u64(seed);

        for i in 0..draws {
            if i % 2 == 0 {
                tool.take_random_serial(&mut rng, &sale_context(), today());
            } else {
                tool.take_serial_set(&mut rng, &sale_context(), today());
            }
            prop_assert_eq!(tool.serial_count(), pool_size);
        }

        let mut all: Vec<String> = tool.available_serials.clone();
        all.extend(tool.sold_serials.iter().map(|s| s.serial.clone()));
        all.sort();
        prop_assert_eq!(all, serials(pool_size));
    }

    /// Selling then releasing a serial restores the tool
    #[test]
    fn prop_release_undoes_sale(pool_size in 1usize..20, pick in any::<prop::sample::Index>()) {
        let pool = serials(pool_size);
        let serial = pool[pick.index(pool_size)].clone();
        let mut tool = tool_with(pool_size as i32, &pool, SetSize::Single);

        tool.sell_unit(Some(serial.as_str()), &sale_context(), today()).unwrap();
        tool.release_unit(Some(serial.as_str())).unwrap();

        prop_assert_eq!(tool.stock, pool_size as i32);
        prop_assert!(tool.sold_serials.is_empty());
        prop_assert!(tool.available_serials.contains(&serial));
        prop_assert_eq!(tool.available_serials.len(), pool_size);
    }

    /// A set allocation returns exactly set-size consecutive serials
    #[test]
    fn prop_set_is_consecutive(
        pool_size in 4usize..30,
        seed in any::<u64>(),
        set_size in set_size_strategy(),
    ) {
        let pool = serials(pool_size);
        let mut tool = tool_with(pool_size as i32, &pool, set_size);
        let mut rng = StdRng::seed_from_u64(seed);

        let set = tool.take_serial_set(&mut rng, &sale_context(), today()).unwrap();
        prop_assert_eq!(set.len(), set_size.units());
        let start = pool.iter().position(|s| s == &set[0]).unwrap();
        prop_assert_eq!(&pool[start..start + set.len()], set.as_slice());
    }
}
