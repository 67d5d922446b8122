//! Account provisioning for staff and customers
//!
//! Provisioning is an explicit service call: it creates the account with a
//! generated password, creates the linked customer record for customer
//! accounts, and emails the credentials best-effort.

use bcrypt::{hash, DEFAULT_COST};
use serde::{Deserialize, Serialize};
use shared::normalize_email;
use sqlx::{PgConnection, PgPool};
use validator::Validate;

use crate::error::{map_unique_violation, AppError, AppResult};
use crate::models::{
    generate_temporary_password, placeholder_email, Customer, Pagination, User, UserRole,
};
use crate::services::receivables::{CustomerDraft, ReceivablesService};
use crate::services::NotificationService;

const USER_COLUMNS: &str = "id, email, name, phone, role, is_active, created_at";

/// Account service for creating staff and customer logins
#[derive(Clone)]
pub struct AccountService {
    db: PgPool,
    notifications: NotificationService,
}

/// Input for provisioning a staff account
#[derive(Debug, Deserialize, Validate)]
pub struct ProvisionStaffInput {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Input for provisioning a customer account with its customer record
#[derive(Debug, Deserialize, Validate)]
pub struct ProvisionCustomerInput {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub state: Option<String>,
}

/// A provisioned customer: the login and the linked receivable record
#[derive(Debug, Serialize)]
pub struct ProvisionedCustomer {
    pub user: User,
    pub customer: Customer,
}

impl AccountService {
    /// Create a new AccountService instance
    pub fn new(db: PgPool, notifications: NotificationService) -> Self {
        Self { db, notifications }
    }

    /// Create a staff account and email its credentials
    pub async fn provision_staff(&self, input: ProvisionStaffInput) -> AppResult<User> {
        input.validate()?;
        let email = self.require_unused_email(input.email.as_deref()).await?;
        let name = input.name.unwrap_or_default();
        let phone = input.phone.unwrap_or_default();

        let (password, password_hash) = new_password()?;

        let mut conn = self.db.acquire().await?;
        let user =
            insert_user(&mut conn, &email, &name, &phone, UserRole::Staff, &password_hash).await?;
        drop(conn);

        tracing::info!(user_id = user.id, "Staff account provisioned");
        self.notifications
            .send_account_credentials(UserRole::Staff, &user.name, &user.email, &password)
            .await;

        Ok(user)
    }

    /// Create a customer account together with its customer record
    pub async fn provision_customer(
        &self,
        input: ProvisionCustomerInput,
    ) -> AppResult<ProvisionedCustomer> {
        input.validate()?;
        let email = self.require_unused_email(input.email.as_deref()).await?;
        let name = input.name.unwrap_or_default();
        let phone = input.phone.unwrap_or_default();

        let (password, password_hash) = new_password()?;

        let mut tx = self.db.begin().await?;
        let user =
            insert_user(&mut tx, &email, &name, &phone, UserRole::Customer, &password_hash).await?;

        let draft = CustomerDraft {
            user_id: Some(user.id),
            name,
            phone,
            email: Some(email),
            state: input.state,
            ..CustomerDraft::default()
        };
        let customer = ReceivablesService::insert_customer(&mut tx, &draft).await?;
        tx.commit().await?;

        tracing::info!(user_id = user.id, customer_id = customer.id, "Customer account provisioned");
        self.notifications
            .send_account_credentials(UserRole::Customer, &user.name, &user.email, &password)
            .await;

        Ok(ProvisionedCustomer { user, customer })
    }

    /// Create and link an account for an existing customer record
    pub async fn provision_account_for_customer(
        &self,
        customer_id: i64,
    ) -> AppResult<ProvisionedCustomer> {
        let customer = ReceivablesService::new(self.db.clone())
            .get_customer(customer_id)
            .await?;

        if customer.user_id.is_some() {
            return Err(AppError::ValidationError(
                "Customer already has an account.".to_string(),
            ));
        }

        let email = match customer.email.as_deref().filter(|e| !e.trim().is_empty()) {
            Some(email) => email.to_string(),
            None => placeholder_email(&customer.phone),
        };
        let email = self.require_unused_email(Some(&email)).await?;

        let (password, password_hash) = new_password()?;

        let mut tx = self.db.begin().await?;
        let user = insert_user(
            &mut tx,
            &email,
            &customer.name,
            &customer.phone,
            UserRole::Customer,
            &password_hash,
        )
        .await?;
        let customer = ReceivablesService::link_user(&mut tx, customer.id, user.id).await?;
        tx.commit().await?;

        tracing::info!(user_id = user.id, customer_id = customer.id, "Account linked to customer");
        self.notifications
            .send_account_credentials(UserRole::Customer, &user.name, &user.email, &password)
            .await;

        Ok(ProvisionedCustomer { user, customer })
    }

    /// List staff accounts
    pub async fn list_staff(&self, pagination: Pagination) -> AppResult<Vec<User>> {
        let staff = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {}
            FROM users
            WHERE role = 'staff'
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
            USER_COLUMNS
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(staff)
    }

    /// Normalize a required email and make sure no account uses it yet
    async fn require_unused_email(&self, email: Option<&str>) -> AppResult<String> {
        let email = match email.map(str::trim).filter(|e| !e.is_empty()) {
            Some(email) => normalize_email(email),
            None => return Err(AppError::validation("email", "Email is required.")),
        };

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)",
        )
        .bind(&email)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::DuplicateEntry("email".to_string()));
        }

        Ok(email)
    }
}

/// Generate a temporary password and its bcrypt hash
fn new_password() -> AppResult<(String, String)> {
    let password = generate_temporary_password(&mut rand::thread_rng());
    let password_hash = hash(&password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;
    Ok((password, password_hash))
}

/// Insert a user account
pub async fn insert_user(
    conn: &mut PgConnection,
    email: &str,
    name: &str,
    phone: &str,
    role: UserRole,
    password_hash: &str,
) -> AppResult<User> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (email, name, phone, role, is_active, password_hash)
        VALUES ($1, $2, $3, $4, TRUE, $5)
        RETURNING {}
        "#,
        USER_COLUMNS
    ))
    .bind(email)
    .bind(name)
    .bind(phone)
    .bind(role)
    .bind(password_hash)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_unique_violation(e, "email"))
}
