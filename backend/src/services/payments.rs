//! Payment service
//!
//! Recording a payment confirms it immediately and settles the linked sale
//! in the same transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::same_nigerian_phone;
use sqlx::{PgConnection, PgPool};
use validator::Validate;

use crate::error::{map_unique_violation, AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{
    generate_payment_reference, Pagination, Payment, PaymentMethod, PaymentRecordStatus,
};
use crate::services::{non_negative, SalesService};

const PAYMENT_COLUMNS: &str = "id, customer_id, sale_id, amount, payment_method, \
     payment_reference, payment_date, status";

/// Payment service for recording and reviewing payments
#[derive(Clone)]
pub struct PaymentService {
    db: PgPool,
}

/// Input for recording a payment
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentInput {
    /// Paying account; customers always pay as themselves
    pub customer_id: Option<i64>,
    pub sale_id: Option<i64>,
    #[validate(custom = "non_negative")]
    pub amount: Decimal,
    pub payment_method: Option<PaymentMethod>,
    /// Generated when absent
    pub payment_reference: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
}

/// Input for correcting a payment
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePaymentInput {
    #[validate(custom = "non_negative")]
    pub amount: Option<Decimal>,
    pub payment_method: Option<PaymentMethod>,
    #[validate(length(min = 1, message = "Payment reference cannot be blank."))]
    pub payment_reference: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    /// Staff only
    pub status: Option<PaymentRecordStatus>,
}

impl PaymentService {
    /// Create a new PaymentService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a completed payment and mark its sale completed
    pub async fn create_payment(
        &self,
        user: &AuthUser,
        input: CreatePaymentInput,
    ) -> AppResult<Payment> {
        input.validate()?;

        let customer_id = if user.is_admin_or_staff() {
            input.customer_id.unwrap_or(user.user_id)
        } else {
            user.user_id
        };
        let reference = match input
            .payment_reference
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(reference) => reference.to_string(),
            None => generate_payment_reference(&mut rand::thread_rng()),
        };
        let status = PaymentRecordStatus::on_record();

        let mut tx = self.db.begin().await?;

        if let Some(sale_id) = input.sale_id {
            Self::require_sale_payer(&mut tx, user, sale_id).await?;
            if let Some(sale_status) = status.sale_status() {
                SalesService::set_payment_status(&mut tx, sale_id, sale_status).await?;
            }
        }

        let payment = sqlx::query_as::<_, Payment>(&format!(
            r#"
            INSERT INTO payments (
                customer_id, sale_id, amount, payment_method, payment_reference,
                payment_date, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(customer_id)
        .bind(input.sale_id)
        .bind(input.amount)
        .bind(input.payment_method.unwrap_or_default())
        .bind(&reference)
        .bind(input.payment_date.unwrap_or_else(Utc::now))
        .bind(status)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::validation("customer_id", "Paying account does not exist.")
            }
            _ => map_unique_violation(e, "payment_reference"),
        })?;

        tx.commit().await?;

        tracing::info!(
            payment_id = payment.id,
            sale_id = ?payment.sale_id,
            amount = %payment.amount,
            reference = %payment.payment_reference,
            "Payment recorded"
        );
        Ok(payment)
    }

    /// List payments: customers see their own, staff and admins see all
    pub async fn list_payments(
        &self,
        user: &AuthUser,
        pagination: Pagination,
    ) -> AppResult<Vec<Payment>> {
        let payer = if user.is_admin_or_staff() {
            None
        } else {
            Some(user.user_id)
        };

        let payments = sqlx::query_as::<_, Payment>(&format!(
            r#"
            SELECT {}
            FROM payments
            WHERE ($1::bigint IS NULL OR customer_id = $1)
            ORDER BY payment_date DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(payer)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(payments)
    }

    /// Get a payment the caller may see
    pub async fn get_payment(&self, user: &AuthUser, payment_id: i64) -> AppResult<Payment> {
        let payment = self.find(payment_id).await?;
        user.require_owner_or_staff(payment.customer_id)?;
        Ok(payment)
    }

    /// Correct a payment's details
    pub async fn update_payment(
        &self,
        user: &AuthUser,
        payment_id: i64,
        input: UpdatePaymentInput,
    ) -> AppResult<Payment> {
        input.validate()?;

        let existing = self.find(payment_id).await?;
        user.require_owner_or_staff(existing.customer_id)?;
        if input.status.is_some() {
            user.require_admin_or_staff()?;
        }

        let mut tx = self.db.begin().await?;

        let payment = sqlx::query_as::<_, Payment>(&format!(
            r#"
            UPDATE payments
            SET amount = COALESCE($1, amount),
                payment_method = COALESCE($2, payment_method),
                payment_reference = COALESCE($3, payment_reference),
                payment_date = COALESCE($4, payment_date),
                status = COALESCE($5, status)
            WHERE id = $6
            RETURNING {}
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(input.amount)
        .bind(input.payment_method)
        .bind(&input.payment_reference)
        .bind(input.payment_date)
        .bind(input.status)
        .bind(payment_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "payment_reference"))?
        .ok_or_else(|| AppError::NotFound("Payment".to_string()))?;

        if let (Some(_), Some(sale_id)) = (input.status, payment.sale_id) {
            if let Some(sale_status) = payment.status.sale_status() {
                SalesService::set_payment_status(&mut tx, sale_id, sale_status).await?;
            }
        }

        tx.commit().await?;
        Ok(payment)
    }

    /// Delete a payment
    pub async fn delete_payment(&self, user: &AuthUser, payment_id: i64) -> AppResult<()> {
        let payment = self.find(payment_id).await?;
        user.require_owner_or_staff(payment.customer_id)?;

        sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(payment.id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Lock the sale a payment settles and check the caller may pay it
    async fn require_sale_payer(
        conn: &mut PgConnection,
        user: &AuthUser,
        sale_id: i64,
    ) -> AppResult<()> {
        let sale = SalesService::lock_sale(&mut *conn, sale_id).await?;
        if user.is_admin_or_staff() {
            return Ok(());
        }

        let customer_phone: Option<String> =
            sqlx::query_scalar("SELECT phone FROM customers WHERE user_id = $1")
                .bind(user.user_id)
                .fetch_optional(&mut *conn)
                .await?;

        if may_settle_sale(user, customer_phone.as_deref(), &sale.phone) {
            Ok(())
        } else {
            Err(AppError::forbidden("You can only pay for your own purchases."))
        }
    }

    async fn find(&self, payment_id: i64) -> AppResult<Payment> {
        sqlx::query_as::<_, Payment>(&format!(
            "SELECT {} FROM payments WHERE id = $1",
            PAYMENT_COLUMNS
        ))
        .bind(payment_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Payment".to_string()))
    }
}

/// Staff may settle any sale; customers only sales made out to their phone
fn may_settle_sale(user: &AuthUser, customer_phone: Option<&str>, sale_phone: &str) -> bool {
    user.is_admin_or_staff()
        || customer_phone.is_some_and(|phone| same_nigerian_phone(phone, sale_phone))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;

    fn caller(role: UserRole) -> AuthUser {
        AuthUser {
            user_id: 7,
            email: "ada@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn customers_settle_only_their_own_sales() {
        let customer = caller(UserRole::Customer);
        assert!(may_settle_sale(&customer, Some("08031234567"), "+2348031234567"));
        assert!(!may_settle_sale(&customer, Some("08031234567"), "08099999999"));
        assert!(!may_settle_sale(&customer, None, "08031234567"));
    }

    #[test]
    fn staff_settle_any_sale() {
        assert!(may_settle_sale(&caller(UserRole::Staff), None, "08099999999"));
        assert!(may_settle_sale(&caller(UserRole::Admin), None, "08099999999"));
    }

    #[test]
    fn payment_method_defaults_to_cash() {
        let input: CreatePaymentInput =
            serde_json::from_value(serde_json::json!({ "amount": "2500.00" })).unwrap();
        assert!(input.validate().is_ok());
        assert_eq!(input.payment_method.unwrap_or_default(), PaymentMethod::Cash);
    }

    #[test]
    fn negative_payment_is_rejected() {
        let input: CreatePaymentInput =
            serde_json::from_value(serde_json::json!({ "amount": "-1", "sale_id": 4 })).unwrap();
        assert!(input.validate().is_err());
    }
}
