//! Receivables service: customers and their installment plans
//!
//! Derived fields (`amount_left`, `progress`, `status`) are recomputed by
//! [`Customer::recalculate`] on every insert and update. Statuses that only
//! move with the calendar are brought up to date by
//! [`ReceivablesService::refresh_statuses`] before they are filtered or
//! counted. The supplied `amount_paid` is trusted as-is; it is not
//! reconciled against payments.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use sqlx::{PgConnection, PgPool};
use validator::Validate;

use crate::error::{map_unique_violation, AppError, AppResult};
use crate::models::{Customer, InstallmentPlan, Pagination, ReceivableStatus};
use crate::services::{non_negative, today};

const CUSTOMER_COLUMNS: &str = "id, user_id, name, phone, email, state, is_activated, \
     total_selling_price, amount_paid, amount_left, progress, status, \
     date_next_installment, created_at, updated_at";

/// Receivables service for managing customers and installment balances
#[derive(Clone)]
pub struct ReceivablesService {
    db: PgPool,
}

/// Everything needed to insert a customer row
#[derive(Debug, Clone, Default)]
pub struct CustomerDraft {
    pub user_id: Option<i64>,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub state: Option<String>,
    pub is_activated: bool,
    pub total_selling_price: Decimal,
    pub amount_paid: Decimal,
    pub date_next_installment: Option<NaiveDate>,
}

/// Input for creating a customer without an account
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerInput {
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,
    #[validate(length(min = 1, message = "Phone is required."))]
    pub phone: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub state: Option<String>,
    #[validate(custom = "non_negative")]
    pub total_selling_price: Option<Decimal>,
    #[validate(custom = "non_negative")]
    pub amount_paid: Option<Decimal>,
    pub date_next_installment: Option<NaiveDate>,
}

/// Input for updating a customer; omitted fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCustomerInput {
    #[validate(length(min = 1, message = "Name cannot be blank."))]
    pub name: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub state: Option<String>,
    #[validate(custom = "non_negative")]
    pub total_selling_price: Option<Decimal>,
    #[validate(custom = "non_negative")]
    pub amount_paid: Option<Decimal>,
    /// `null` clears the next installment date
    #[serde(default, deserialize_with = "deserialize_some")]
    pub date_next_installment: Option<Option<NaiveDate>>,
}

/// Filters for customer listing
#[derive(Debug, Default, Deserialize)]
pub struct CustomerFilter {
    pub status: Option<ReceivableStatus>,
    pub search: Option<String>,
}

/// Distinguish an explicit `null` from an absent field
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl UpdateCustomerInput {
    fn apply(self, customer: &mut Customer) {
        if let Some(name) = self.name {
            customer.name = name;
        }
        if let Some(phone) = self.phone {
            customer.phone = phone;
        }
        if let Some(email) = self.email {
            customer.email = Some(email);
        }
        if let Some(state) = self.state {
            customer.state = Some(state);
        }
        if let Some(total) = self.total_selling_price {
            customer.total_selling_price = total;
        }
        if let Some(paid) = self.amount_paid {
            customer.amount_paid = paid;
        }
        if let Some(next) = self.date_next_installment {
            customer.date_next_installment = next;
        }
    }
}

impl ReceivablesService {
    /// Create a new ReceivablesService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Insert a customer, deriving the receivable fields from the draft
    pub async fn insert_customer(
        conn: &mut PgConnection,
        draft: &CustomerDraft,
    ) -> AppResult<Customer> {
        let plan = InstallmentPlan {
            total_selling_price: draft.total_selling_price,
            amount_paid: draft.amount_paid,
            date_next_installment: draft.date_next_installment,
        };
        let snapshot = plan.snapshot(today());

        let customer = sqlx::query_as::<_, Customer>(&format!(
            r#"
            INSERT INTO customers (
                user_id, name, phone, email, state, is_activated,
                total_selling_price, amount_paid, amount_left, progress, status,
                date_next_installment
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            CUSTOMER_COLUMNS
        ))
        .bind(draft.user_id)
        .bind(&draft.name)
        .bind(&draft.phone)
        .bind(&draft.email)
        .bind(&draft.state)
        .bind(draft.is_activated)
        .bind(plan.total_selling_price)
        .bind(plan.amount_paid)
        .bind(snapshot.amount_left)
        .bind(snapshot.progress)
        .bind(snapshot.status)
        .bind(plan.date_next_installment)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| map_unique_violation(e, "user"))?;

        Ok(customer)
    }

    /// Create a customer record with no linked account
    pub async fn create_customer(&self, input: CreateCustomerInput) -> AppResult<Customer> {
        input.validate()?;

        let draft = CustomerDraft {
            user_id: None,
            name: input.name,
            phone: input.phone,
            email: input.email,
            state: input.state,
            is_activated: false,
            total_selling_price: input.total_selling_price.unwrap_or_default(),
            amount_paid: input.amount_paid.unwrap_or_default(),
            date_next_installment: input.date_next_installment,
        };

        let mut conn = self.db.acquire().await?;
        let customer = Self::insert_customer(&mut conn, &draft).await?;
        tracing::info!(customer_id = customer.id, status = customer.status.as_str(), "Customer created");
        Ok(customer)
    }

    /// Get a customer by id
    pub async fn get_customer(&self, customer_id: i64) -> AppResult<Customer> {
        sqlx::query_as::<_, Customer>(&format!(
            "SELECT {} FROM customers WHERE id = $1",
            CUSTOMER_COLUMNS
        ))
        .bind(customer_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))
    }

    /// List customers, newest first
    pub async fn list_customers(
        &self,
        filter: &CustomerFilter,
        pagination: Pagination,
    ) -> AppResult<Vec<Customer>> {
        if filter.status.is_some() {
            let mut conn = self.db.acquire().await?;
            Self::refresh_statuses(&mut conn, today()).await?;
        }

        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let customers = sqlx::query_as::<_, Customer>(&format!(
            r#"
            SELECT {}
            FROM customers
            WHERE ($1::receivable_status IS NULL OR status = $1)
              AND ($2::text IS NULL OR name ILIKE $2 OR phone ILIKE $2 OR email ILIKE $2)
            ORDER BY id DESC
            LIMIT $3 OFFSET $4
            "#,
            CUSTOMER_COLUMNS
        ))
        .bind(filter.status)
        .bind(search)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(customers)
    }

    /// Update a customer and recompute its receivable
    pub async fn update_customer(
        &self,
        customer_id: i64,
        input: UpdateCustomerInput,
    ) -> AppResult<Customer> {
        input.validate()?;

        let mut tx = self.db.begin().await?;

        let mut customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {} FROM customers WHERE id = $1 FOR UPDATE",
            CUSTOMER_COLUMNS
        ))
        .bind(customer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;

        input.apply(&mut customer);
        customer.recalculate(today());

        let customer = Self::save(&mut tx, &customer).await?;
        tx.commit().await?;

        tracing::debug!(
            customer_id = customer.id,
            status = customer.status.as_str(),
            "Customer receivable recalculated"
        );
        Ok(customer)
    }

    /// Delete a customer
    pub async fn delete_customer(&self, customer_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(customer_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Customer".to_string()));
        }

        Ok(())
    }

    /// Link an account to a customer that has none
    pub async fn link_user(
        conn: &mut PgConnection,
        customer_id: i64,
        user_id: i64,
    ) -> AppResult<Customer> {
        sqlx::query_as::<_, Customer>(&format!(
            r#"
            UPDATE customers SET user_id = $1, updated_at = NOW()
            WHERE id = $2 AND user_id IS NULL
            RETURNING {}
            "#,
            CUSTOMER_COLUMNS
        ))
        .bind(user_id)
        .bind(customer_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::ValidationError("Customer already has an account.".to_string()))
    }

    /// Persist every mutable field of an already-recalculated customer
    async fn save(conn: &mut PgConnection, customer: &Customer) -> AppResult<Customer> {
        let saved = sqlx::query_as::<_, Customer>(&format!(
            r#"
            UPDATE customers
            SET name = $1, phone = $2, email = $3, state = $4,
                total_selling_price = $5, amount_paid = $6, amount_left = $7,
                progress = $8, status = $9, date_next_installment = $10,
                updated_at = NOW()
            WHERE id = $11
            RETURNING {}
            "#,
            CUSTOMER_COLUMNS
        ))
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.state)
        .bind(customer.total_selling_price)
        .bind(customer.amount_paid)
        .bind(customer.amount_left)
        .bind(customer.progress)
        .bind(customer.status)
        .bind(customer.date_next_installment)
        .bind(customer.id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(saved)
    }

    /// Re-evaluate stored statuses that a change of date may have made stale.
    ///
    /// Only open plans with a next installment date can drift; a row saved
    /// concurrently keeps whatever its own save computed.
    pub async fn refresh_statuses(conn: &mut PgConnection, today: NaiveDate) -> AppResult<usize> {
        let open = sqlx::query_as::<_, (i64, Decimal, Option<NaiveDate>, ReceivableStatus)>(
            r#"
            SELECT id, amount_left, date_next_installment, status
            FROM customers
            WHERE amount_left > 0 AND date_next_installment IS NOT NULL
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        let stale = stale_statuses(open, today);
        for (id, previous, status) in &stale {
            sqlx::query("UPDATE customers SET status = $1 WHERE id = $2 AND status = $3")
                .bind(status)
                .bind(id)
                .bind(previous)
                .execute(&mut *conn)
                .await?;
        }

        if !stale.is_empty() {
            tracing::info!(count = stale.len(), "Receivable statuses refreshed");
        }
        Ok(stale.len())
    }
}

/// Rows whose stored status no longer matches today's evaluation, as
/// `(id, stored, current)`
fn stale_statuses<I>(rows: I, today: NaiveDate) -> Vec<(i64, ReceivableStatus, ReceivableStatus)>
where
    I: IntoIterator<Item = (i64, Decimal, Option<NaiveDate>, ReceivableStatus)>,
{
    rows.into_iter()
        .filter_map(|(id, left, due, stored)| {
            let current = ReceivableStatus::evaluate(left, due, today);
            (current != stored).then_some((id, stored, current))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn customer() -> Customer {
        Customer {
            id: 1,
            user_id: None,
            name: "Chidi Okeke".to_string(),
            phone: "08031234567".to_string(),
            email: None,
            state: Some("Lagos".to_string()),
            is_activated: false,
            total_selling_price: Decimal::from(1000),
            amount_paid: Decimal::ZERO,
            amount_left: Decimal::from(1000),
            progress: Decimal::ZERO,
            status: ReceivableStatus::OnTrack,
            date_next_installment: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn explicit_null_clears_next_installment() {
        let input: UpdateCustomerInput =
            serde_json::from_str(r#"{"date_next_installment": null}"#).unwrap();
        assert_eq!(input.date_next_installment, Some(None));

        let input: UpdateCustomerInput = serde_json::from_str("{}").unwrap();
        assert_eq!(input.date_next_installment, None);
    }

    #[test]
    fn update_then_recalculate() {
        let mut c = customer();
        c.date_next_installment = NaiveDate::from_ymd_opt(2020, 1, 1);
        UpdateCustomerInput {
            amount_paid: Some(Decimal::from(400)),
            ..Default::default()
        }
        .apply(&mut c);
        c.recalculate(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());

        assert_eq!(c.amount_left, Decimal::from(600));
        assert_eq!(c.progress, Decimal::from(40));
        assert_eq!(c.status, ReceivableStatus::Overdue);
    }

    #[test]
    fn passing_due_dates_make_statuses_stale() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let left = Decimal::from(500);
        let rows = vec![
            (1, left, NaiveDate::from_ymd_opt(2025, 3, 9), ReceivableStatus::DueSoon),
            (2, left, NaiveDate::from_ymd_opt(2025, 3, 12), ReceivableStatus::OnTrack),
            (3, left, NaiveDate::from_ymd_opt(2025, 4, 30), ReceivableStatus::OnTrack),
            (4, left, NaiveDate::from_ymd_opt(2025, 3, 1), ReceivableStatus::Overdue),
        ];

        assert_eq!(
            stale_statuses(rows, today),
            vec![
                (1, ReceivableStatus::DueSoon, ReceivableStatus::Overdue),
                (2, ReceivableStatus::OnTrack, ReceivableStatus::DueSoon),
            ]
        );
    }

    #[test]
    fn negative_amounts_fail_validation() {
        let input = UpdateCustomerInput {
            amount_paid: Some(Decimal::from(-1)),
            ..Default::default()
        };
        assert!(input.validate().is_err());
    }
}
