//! Sales service: sale headers, line items, and invoice numbering
//!
//! A sale and its items are written in one transaction together with the
//! stock and serial changes on every tool involved.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{map_unique_violation, AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{
    generate_invoice_number, items_total, Pagination, PaymentStatus, Sale, SaleItem,
    SerialSaleContext,
};
use crate::services::{non_negative, today, CatalogService};

const SALE_COLUMNS: &str = "id, staff_id, name, phone, state, total_cost, date_sold, \
     invoice_number, payment_plan, expiry_date, payment_status";

const SALE_ITEM_COLUMNS: &str =
    "id, sale_id, tool_id, equipment, cost, category, serial_number, created_at";

/// Attempts at a fresh invoice number before giving up
const MAX_INVOICE_ATTEMPTS: usize = 5;

/// Sales service for recording transactions
#[derive(Clone)]
pub struct SalesService {
    db: PgPool,
}

/// One unit of a tool on a sale
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SaleItemInput {
    pub tool_id: Uuid,
    /// Defaults to the tool's name
    pub equipment: Option<String>,
    /// Defaults to the tool's cost
    #[validate(custom = "non_negative")]
    pub cost: Option<Decimal>,
    pub category: Option<String>,
    #[validate(length(max = 100, message = "Serial number must be at most 100 characters."))]
    pub serial_number: Option<String>,
}

/// Input for recording a sale
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSaleInput {
    #[validate(length(min = 1, message = "Customer name is required."))]
    pub name: String,
    #[validate(length(min = 1, message = "Customer phone is required."))]
    pub phone: String,
    pub state: Option<String>,
    /// Defaults to the sum of item costs
    #[validate(custom = "non_negative")]
    pub total_cost: Option<Decimal>,
    pub date_sold: Option<NaiveDate>,
    /// Generated when absent
    #[validate(length(max = 32, message = "Invoice number must be at most 32 characters."))]
    pub invoice_number: Option<String>,
    pub payment_plan: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    #[validate(length(min = 1, message = "A sale needs at least one item."))]
    pub items: Vec<SaleItemInput>,
}

/// Input for updating a sale; `items` replaces the whole item list
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateSaleInput {
    #[validate(length(min = 1, message = "Customer name cannot be blank."))]
    pub name: Option<String>,
    pub phone: Option<String>,
    pub state: Option<String>,
    #[validate(custom = "non_negative")]
    pub total_cost: Option<Decimal>,
    pub date_sold: Option<NaiveDate>,
    pub payment_plan: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub expiry_date: Option<Option<NaiveDate>>,
    pub items: Option<Vec<SaleItemInput>>,
}

/// Distinguish an explicit `null` from an absent field
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl SalesService {
    /// Create a new SalesService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a sale with its items, generating an invoice number when needed
    pub async fn create_sale(&self, user: &AuthUser, input: CreateSaleInput) -> AppResult<Sale> {
        self.create_sale_with(user, input, || {
            generate_invoice_number(&mut rand::thread_rng())
        })
        .await
    }

    /// Record a sale, drawing fresh invoice numbers from `next_invoice`
    pub async fn create_sale_with<F>(
        &self,
        user: &AuthUser,
        input: CreateSaleInput,
        mut next_invoice: F,
    ) -> AppResult<Sale>
    where
        F: FnMut() -> String,
    {
        user.require_admin_or_staff()?;
        input.validate()?;
        for item in &input.items {
            item.validate()?;
        }

        let supplied = input
            .invoice_number
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let mut attempt = 0;
        loop {
            attempt += 1;
            let invoice_number = match &supplied {
                Some(invoice) => invoice.clone(),
                None => next_invoice(),
            };

            match self.insert_sale(user, &input, &invoice_number).await {
                Err(AppError::DuplicateEntry(field))
                    if field == "invoice_number"
                        && supplied.is_none()
                        && attempt < MAX_INVOICE_ATTEMPTS =>
                {
                    tracing::warn!(
                        invoice_number = %invoice_number,
                        attempt,
                        "Invoice number collision, regenerating"
                    );
                }
                result => return result,
            }
        }
    }

    async fn insert_sale(
        &self,
        user: &AuthUser,
        input: &CreateSaleInput,
        invoice_number: &str,
    ) -> AppResult<Sale> {
        let mut tx = self.db.begin().await?;

        let mut sale = sqlx::query_as::<_, Sale>(&format!(
            r#"
            INSERT INTO sales (
                staff_id, name, phone, state, total_cost, date_sold, invoice_number,
                payment_plan, expiry_date, payment_status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            SALE_COLUMNS
        ))
        .bind(user.user_id)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.state)
        .bind(input.total_cost.unwrap_or_default())
        .bind(input.date_sold.unwrap_or_else(today))
        .bind(invoice_number)
        .bind(&input.payment_plan)
        .bind(input.expiry_date)
        .bind(PaymentStatus::for_new_sale(input.payment_plan.as_deref()))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "invoice_number"))?;

        sale.items = Self::allocate_items(&mut tx, &sale, &input.items).await?;

        if input.total_cost.is_none() {
            sale.total_cost = items_total(sale.items.iter().map(|item| &item.cost));
            sqlx::query("UPDATE sales SET total_cost = $1 WHERE id = $2")
                .bind(sale.total_cost)
                .bind(sale.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            sale_id = sale.id,
            invoice_number = %sale.invoice_number,
            items = sale.items.len(),
            total_cost = %sale.total_cost,
            "Sale recorded"
        );
        Ok(sale)
    }

    /// List sales visible to the caller: staff see their own, admins see all
    pub async fn list_sales(&self, user: &AuthUser, pagination: Pagination) -> AppResult<Vec<Sale>> {
        if !user.is_admin_or_staff() {
            return Ok(Vec::new());
        }

        let owner = if user.is_admin() { None } else { Some(user.user_id) };

        let mut sales = sqlx::query_as::<_, Sale>(&format!(
            r#"
            SELECT {}
            FROM sales
            WHERE ($1::bigint IS NULL OR staff_id = $1)
            ORDER BY date_sold DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
            SALE_COLUMNS
        ))
        .bind(owner)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        let ids: Vec<i64> = sales.iter().map(|s| s.id).collect();
        let items = sqlx::query_as::<_, SaleItem>(&format!(
            "SELECT {} FROM sale_items WHERE sale_id = ANY($1) ORDER BY id",
            SALE_ITEM_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        for item in items {
            if let Some(sale) = sales.iter_mut().find(|s| s.id == item.sale_id) {
                sale.items.push(item);
            }
        }

        Ok(sales)
    }

    /// Get a sale with its items
    pub async fn get_sale(&self, user: &AuthUser, sale_id: i64) -> AppResult<Sale> {
        user.require_admin_or_staff()?;

        let mut sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {} FROM sales WHERE id = $1",
            SALE_COLUMNS
        ))
        .bind(sale_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        Self::require_sale_owner(user, &sale)?;

        let mut conn = self.db.acquire().await?;
        sale.items = Self::load_items(&mut conn, sale.id).await?;
        Ok(sale)
    }

    /// Update a sale; a new item list releases the old items first
    pub async fn update_sale(
        &self,
        user: &AuthUser,
        sale_id: i64,
        input: UpdateSaleInput,
    ) -> AppResult<Sale> {
        user.require_admin_or_staff()?;
        input.validate()?;
        for item in input.items.iter().flatten() {
            item.validate()?;
        }
        if input.items.as_ref().is_some_and(Vec::is_empty) {
            return Err(AppError::validation("items", "A sale needs at least one item."));
        }

        let mut tx = self.db.begin().await?;
        let mut sale = Self::lock_sale(&mut tx, sale_id).await?;
        Self::require_sale_owner(user, &sale)?;

        if let Some(name) = input.name {
            sale.name = name;
        }
        if let Some(phone) = input.phone {
            sale.phone = phone;
        }
        if input.state.is_some() {
            sale.state = input.state;
        }
        if let Some(date_sold) = input.date_sold {
            sale.date_sold = date_sold;
        }
        if input.payment_plan.is_some() {
            sale.payment_plan = input.payment_plan;
        }
        if let Some(status) = input.payment_status {
            sale.payment_status = status;
        }
        if let Some(expiry) = input.expiry_date {
            sale.expiry_date = expiry;
        }

        match input.items {
            Some(items) => {
                let old_items = Self::load_items(&mut tx, sale.id).await?;
                CatalogService::lock_tools(
                    &mut tx,
                    old_items
                        .iter()
                        .map(|item| item.tool_id)
                        .chain(items.iter().map(|item| item.tool_id)),
                )
                .await?;
                Self::release_items(&mut tx, &old_items).await?;
                sqlx::query("DELETE FROM sale_items WHERE sale_id = $1")
                    .bind(sale.id)
                    .execute(&mut *tx)
                    .await?;
                sale.items = Self::allocate_items(&mut tx, &sale, &items).await?;
                if input.total_cost.is_none() {
                    sale.total_cost = items_total(sale.items.iter().map(|item| &item.cost));
                }
            }
            None => sale.items = Self::load_items(&mut tx, sale.id).await?,
        }
        if let Some(total) = input.total_cost {
            sale.total_cost = total;
        }

        let items = std::mem::take(&mut sale.items);
        let mut sale = sqlx::query_as::<_, Sale>(&format!(
            r#"
            UPDATE sales
            SET name = $1, phone = $2, state = $3, total_cost = $4, date_sold = $5,
                payment_plan = $6, payment_status = $7, expiry_date = $8
            WHERE id = $9
            RETURNING {}
            "#,
            SALE_COLUMNS
        ))
        .bind(&sale.name)
        .bind(&sale.phone)
        .bind(&sale.state)
        .bind(sale.total_cost)
        .bind(sale.date_sold)
        .bind(&sale.payment_plan)
        .bind(sale.payment_status)
        .bind(sale.expiry_date)
        .bind(sale.id)
        .fetch_one(&mut *tx)
        .await?;
        sale.items = items;

        tx.commit().await?;

        tracing::info!(sale_id = sale.id, "Sale updated");
        Ok(sale)
    }

    /// Delete a sale, returning its units to stock
    pub async fn delete_sale(&self, user: &AuthUser, sale_id: i64) -> AppResult<()> {
        user.require_admin_or_staff()?;

        let mut tx = self.db.begin().await?;
        let sale = Self::lock_sale(&mut tx, sale_id).await?;
        Self::require_sale_owner(user, &sale)?;

        let items = Self::load_items(&mut tx, sale.id).await?;
        Self::release_items(&mut tx, &items).await?;

        sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(sale.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(sale_id, released = items.len(), "Sale deleted");
        Ok(())
    }

    /// Set a sale's payment status inside a caller's transaction
    pub async fn set_payment_status(
        conn: &mut PgConnection,
        sale_id: i64,
        status: PaymentStatus,
    ) -> AppResult<()> {
        let result = sqlx::query("UPDATE sales SET payment_status = $1 WHERE id = $2")
            .bind(status)
            .bind(sale_id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Sale".to_string()));
        }

        Ok(())
    }

    fn require_sale_owner(user: &AuthUser, sale: &Sale) -> AppResult<()> {
        if user.is_admin() || sale.staff_id == user.user_id {
            Ok(())
        } else {
            Err(AppError::forbidden("You can only manage your own sales."))
        }
    }

    /// Load a sale header and hold its row lock for the rest of the transaction
    pub(crate) async fn lock_sale(conn: &mut PgConnection, sale_id: i64) -> AppResult<Sale> {
        sqlx::query_as::<_, Sale>(&format!(
            "SELECT {} FROM sales WHERE id = $1 FOR UPDATE",
            SALE_COLUMNS
        ))
        .bind(sale_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))
    }

    async fn load_items(conn: &mut PgConnection, sale_id: i64) -> AppResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(&format!(
            "SELECT {} FROM sale_items WHERE sale_id = $1 ORDER BY id",
            SALE_ITEM_COLUMNS
        ))
        .bind(sale_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(items)
    }

    /// Take one unit per item from stock and write the item rows
    async fn allocate_items(
        conn: &mut PgConnection,
        sale: &Sale,
        items: &[SaleItemInput],
    ) -> AppResult<Vec<SaleItem>> {
        let context = SerialSaleContext {
            sale_id: Some(sale.id),
            customer_name: Some(sale.name.clone()),
            invoice_number: Some(sale.invoice_number.clone()),
            date_sold: Some(sale.date_sold),
        };

        CatalogService::lock_tools(&mut *conn, items.iter().map(|item| item.tool_id)).await?;

        let mut saved = Vec::with_capacity(items.len());
        for item in items {
            let serial = item
                .serial_number
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty());
            let tool = CatalogService::sell_unit(&mut *conn, item.tool_id, serial, &context).await?;

            let row = sqlx::query_as::<_, SaleItem>(&format!(
                r#"
                INSERT INTO sale_items (sale_id, tool_id, equipment, cost, category, serial_number)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {}
                "#,
                SALE_ITEM_COLUMNS
            ))
            .bind(sale.id)
            .bind(tool.id)
            .bind(item.equipment.as_deref().unwrap_or(&tool.name))
            .bind(item.cost.unwrap_or(tool.cost))
            .bind(item.category.as_deref().unwrap_or(&tool.category))
            .bind(serial)
            .fetch_one(&mut *conn)
            .await?;

            tracing::debug!(
                sale_id = sale.id,
                tool_id = %tool.id,
                stock = tool.stock,
                "Unit allocated to sale"
            );
            saved.push(row);
        }

        Ok(saved)
    }

    async fn release_items(conn: &mut PgConnection, items: &[SaleItem]) -> AppResult<()> {
        CatalogService::lock_tools(&mut *conn, items.iter().map(|item| item.tool_id)).await?;
        for item in items {
            CatalogService::release_unit(&mut *conn, item.tool_id, item.serial_number.as_deref())
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{INVOICE_NUMBER_MAX_LEN, SERIAL_MAX_LEN};

    const TOOL_ID: &str = "9f1c2d3e-4b5a-4c6d-8e7f-0a1b2c3d4e5f";

    fn sale_json(extra: serde_json::Value) -> CreateSaleInput {
        let mut body = serde_json::json!({
            "name": "Emeka Obi",
            "phone": "08031234567",
            "items": [{ "tool_id": TOOL_ID }]
        });
        if let (Some(body), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
            body.extend(extra.clone());
        }
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn item_costs_are_validated() {
        let input = sale_json(serde_json::json!({
            "items": [{ "tool_id": TOOL_ID, "cost": "-5" }]
        }));
        assert!(input.validate().is_ok());
        assert!(input.items[0].validate().is_err());
    }

    #[test]
    fn blank_customer_name_is_rejected() {
        let input = sale_json(serde_json::json!({ "name": "" }));
        assert!(input.validate().is_err());
    }

    #[test]
    fn sale_without_items_is_rejected() {
        let input = sale_json(serde_json::json!({ "items": [] }));
        assert!(input.validate().is_err());

        let missing: Result<CreateSaleInput, _> = serde_json::from_value(serde_json::json!({
            "name": "Emeka Obi",
            "phone": "08031234567"
        }));
        assert!(missing.is_err());
    }

    #[test]
    fn invoice_number_fits_column() {
        let fits = sale_json(serde_json::json!({
            "invoice_number": "I".repeat(INVOICE_NUMBER_MAX_LEN)
        }));
        assert!(fits.validate().is_ok());

        let too_long = sale_json(serde_json::json!({
            "invoice_number": "I".repeat(INVOICE_NUMBER_MAX_LEN + 1)
        }));
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn serial_number_fits_column() {
        let input = sale_json(serde_json::json!({
            "items": [
                { "tool_id": TOOL_ID, "serial_number": "S".repeat(SERIAL_MAX_LEN) },
                { "tool_id": TOOL_ID, "serial_number": "S".repeat(SERIAL_MAX_LEN + 1) }
            ]
        }));
        assert!(input.items[0].validate().is_ok());
        assert!(input.items[1].validate().is_err());
    }

    #[test]
    fn items_are_optional_on_update() {
        let input: UpdateSaleInput =
            serde_json::from_value(serde_json::json!({ "payment_status": "completed" })).unwrap();
        assert!(input.items.is_none());
        assert_eq!(input.payment_status, Some(PaymentStatus::Completed));
        assert!(input.validate().is_ok());
    }
}
