//! User accounts and roles

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of random bytes behind a generated temporary password
pub const TEMPORARY_PASSWORD_BYTES: usize = 10;

/// Role of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "user_role", rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Staff,
    #[default]
    Customer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Staff => "staff",
            UserRole::Customer => "customer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(UserRole::Admin),
            "staff" => Some(UserRole::Staff),
            "customer" => Some(UserRole::Customer),
            _ => None,
        }
    }

    /// Admins and staff run the shop; customers only see their own records
    pub fn is_admin_or_staff(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Staff)
    }

    pub fn can_manage_catalog(&self) -> bool {
        self.is_admin_or_staff()
    }

    pub fn can_manage_staff(&self) -> bool {
        self.is_admin_or_staff()
    }

    /// Whether this role may read a record owned by `owner_id`
    pub fn can_access_owned(&self, user_id: i64, owner_id: i64) -> bool {
        self.is_admin_or_staff() || user_id == owner_id
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user account, keyed by email
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Generate a URL-safe temporary password for a freshly provisioned account
pub fn generate_temporary_password<R: Rng>(rng: &mut R) -> String {
    let mut bytes = [0u8; TEMPORARY_PASSWORD_BYTES];
    rng.fill(&mut bytes[..]);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Fallback login address for customers registered without an email
pub fn placeholder_email(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    format!("{}@customers.invalid", digits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn role_round_trips_through_str() {
        for role in [UserRole::Admin, UserRole::Staff, UserRole::Customer] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::parse("owner"), None);
    }

    #[test]
    fn only_customers_are_restricted_to_their_own_records() {
        assert!(UserRole::Staff.can_access_owned(1, 2));
        assert!(UserRole::Admin.can_access_owned(1, 2));
        assert!(UserRole::Customer.can_access_owned(2, 2));
        assert!(!UserRole::Customer.can_access_owned(1, 2));
    }

    #[test]
    fn temporary_password_is_url_safe() {
        let mut rng = StdRng::seed_from_u64(7);
        let password = generate_temporary_password(&mut rng);
        // 10 bytes encode to 14 unpadded base64 characters
        assert_eq!(password.len(), 14);
        assert!(password
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn placeholder_email_uses_phone_digits() {
        assert_eq!(placeholder_email("+234 803-123-4567"), "2348031234567@customers.invalid");
    }
}
