//! Tests for account roles, provisioning helpers, and input validation

use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use shared::{
    generate_temporary_password, normalize_email, placeholder_email, validate_email,
    validate_tool_code, Pagination, UserRole,
};

// =============================================================================
// Role checks
// =============================================================================

mod roles {
    use super::*;

    #[test]
    fn staff_and_admin_run_the_shop() {
        assert!(UserRole::Admin.is_admin_or_staff());
        assert!(UserRole::Staff.is_admin_or_staff());
        assert!(!UserRole::Customer.is_admin_or_staff());
        assert!(!UserRole::Customer.can_manage_catalog());
        assert!(!UserRole::Customer.can_manage_staff());
    }

    #[test]
    fn new_accounts_default_to_customer() {
        assert_eq!(UserRole::default(), UserRole::Customer);
    }

    #[test]
    fn roles_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&UserRole::Staff).unwrap(), "\"staff\"");
        let role: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, UserRole::Admin);
    }
}

// =============================================================================
// Provisioning helpers
// =============================================================================

mod provisioning {
    use super::*;

    #[test]
    fn temporary_password_is_url_safe() {
        let password = generate_temporary_password(&mut StdRng::seed_from_u64(9));
        assert_eq!(password.len(), 14);
        assert!(password
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn placeholder_email_uses_phone_digits() {
        assert_eq!(
            placeholder_email("+234 803 123 4567"),
            "2348031234567@customers.invalid"
        );
    }

    #[test]
    fn email_domain_is_case_insensitive() {
        assert_eq!(normalize_email(" Ada@Example.COM "), "Ada@example.com");
    }

    #[test]
    fn pagination_is_capped() {
        let page = Pagination {
            page: 3,
            per_page: 10_000,
        };
        assert_eq!(page.limit(), i64::from(Pagination::MAX_PER_PAGE));
        assert_eq!(page.offset(), 2 * i64::from(Pagination::MAX_PER_PAGE));
    }
}

// =============================================================================
// Properties
// =============================================================================

fn role_strategy() -> impl Strategy<Value = UserRole> {
    prop_oneof![
        Just(UserRole::Admin),
        Just(UserRole::Staff),
        Just(UserRole::Customer),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Customers reach a record only when they own it; staff reach everything
    #[test]
    fn prop_ownership_rule(role in role_strategy(), user_id in 1i64..1000, owner_id in 1i64..1000) {
        let allowed = role.can_access_owned(user_id, owner_id);
        if role.is_admin_or_staff() {
            prop_assert!(allowed);
        } else {
            prop_assert_eq!(allowed, user_id == owner_id);
        }
    }

    #[test]
    fn prop_role_round_trip(role in role_strategy()) {
        prop_assert_eq!(UserRole::parse(role.as_str()), Some(role));
    }

    #[test]
    fn prop_generated_passwords_differ(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let first = generate_temporary_password(&mut rng);
        let second = generate_temporary_password(&mut rng);
        prop_assert_ne!(first, second);
    }

    #[test]
    fn prop_valid_emails_accepted(email in "[a-z]{3,10}@[a-z]{3,8}\\.(com|ng|org)") {
        prop_assert!(validate_email(&email).is_ok());
        prop_assert_eq!(normalize_email(&email), email);
    }

    #[test]
    fn prop_tool_codes(code in "[A-Z0-9][A-Z0-9_/-]{0,30}") {
        prop_assert!(validate_tool_code(&code).is_ok());
    }
}
