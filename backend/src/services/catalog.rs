//! Catalog service: tools with their stock and serial pools, equipment
//! types, and suppliers
//!
//! Every mutation of a tool's stock or serials goes through
//! [`CatalogService::lock_tool`] and [`CatalogService::store_inventory`]
//! inside one transaction, so concurrent sales serialize on the tool row.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{types::Json, FromRow, PgConnection, PgPool};
use shared::{validate_expiry_date, validate_serials, validate_tool_code, InventoryError};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::{map_unique_violation, AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{
    EquipmentType, Pagination, SerialSaleContext, SetSize, SoldSerial, Supplier, Tool, ToolStatus,
};
use crate::services::{non_negative, today};

const TOOL_COLUMNS: &str = "id, name, code, category, description, cost, stock, status, \
     is_enabled, supplier_id, equipment_type_id, invoice_number, set_size, date_added, \
     expiry_date, available_serials, sold_serials";

const EQUIPMENT_TYPE_COLUMNS: &str =
    "id, name, default_cost, category, description, invoice_number, created_at";

const SUPPLIER_COLUMNS: &str = "id, name, contact_person, phone, email, address, created_at";

/// Catalog service for tools and reference data
#[derive(Clone)]
pub struct CatalogService {
    db: PgPool,
}

/// Tool row as stored
#[derive(Debug, FromRow)]
struct ToolRecord {
    id: Uuid,
    name: String,
    code: String,
    category: String,
    description: String,
    cost: Decimal,
    stock: i32,
    status: ToolStatus,
    is_enabled: bool,
    supplier_id: Option<Uuid>,
    equipment_type_id: Option<Uuid>,
    invoice_number: Option<String>,
    set_size: SetSize,
    date_added: DateTime<Utc>,
    expiry_date: Option<NaiveDate>,
    available_serials: Vec<String>,
    sold_serials: Json<Vec<SoldSerial>>,
}

impl From<ToolRecord> for Tool {
    fn from(r: ToolRecord) -> Self {
        Tool {
            id: r.id,
            name: r.name,
            code: r.code,
            category: r.category,
            description: r.description,
            cost: r.cost,
            stock: r.stock,
            status: r.status,
            is_enabled: r.is_enabled,
            supplier_id: r.supplier_id,
            equipment_type_id: r.equipment_type_id,
            invoice_number: r.invoice_number,
            set_size: r.set_size,
            date_added: r.date_added,
            expiry_date: r.expiry_date,
            available_serials: r.available_serials,
            sold_serials: r.sold_serials.0,
        }
    }
}

fn valid_tool_code(code: &str) -> Result<(), ValidationError> {
    validate_tool_code(code).map_err(|msg| {
        let mut err = ValidationError::new("tool_code");
        err.message = Some(msg.into());
        err
    })
}

fn valid_serials(serials: &[String]) -> Result<(), ValidationError> {
    validate_serials(serials).map_err(|msg| {
        let mut err = ValidationError::new("serials");
        err.message = Some(msg.into());
        err
    })
}

/// Distinct tool ids in the order their rows are locked
pub fn lock_order<I>(tool_ids: I) -> Vec<Uuid>
where
    I: IntoIterator<Item = Uuid>,
{
    let mut ids: Vec<Uuid> = tool_ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Distinguish an explicit `null` from an absent field
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Input for creating a tool
#[derive(Debug, Deserialize, Validate)]
pub struct CreateToolInput {
    #[validate(length(min = 1, max = 100, message = "Name is required."))]
    pub name: String,
    #[validate(custom = "valid_tool_code")]
    pub code: String,
    #[validate(length(min = 1, message = "Category is required."))]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[validate(custom = "non_negative")]
    pub cost: Decimal,
    /// Defaults to the number of serials supplied
    #[validate(range(min = 0, message = "Stock cannot be negative."))]
    pub stock: Option<i32>,
    pub status: Option<ToolStatus>,
    pub is_enabled: Option<bool>,
    pub supplier_id: Option<Uuid>,
    pub equipment_type_id: Option<Uuid>,
    pub invoice_number: Option<String>,
    pub set_size: Option<SetSize>,
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(custom = "valid_serials")]
    pub serials: Vec<String>,
}

/// Input for updating a tool; serial pools change through dedicated calls
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateToolInput {
    #[validate(length(min = 1, max = 100, message = "Name cannot be blank."))]
    pub name: Option<String>,
    #[validate(custom = "valid_tool_code")]
    pub code: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    #[validate(custom = "non_negative")]
    pub cost: Option<Decimal>,
    #[validate(range(min = 0, message = "Stock cannot be negative."))]
    pub stock: Option<i32>,
    pub status: Option<ToolStatus>,
    pub is_enabled: Option<bool>,
    pub supplier_id: Option<Uuid>,
    pub equipment_type_id: Option<Uuid>,
    pub invoice_number: Option<String>,
    pub set_size: Option<SetSize>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub expiry_date: Option<Option<NaiveDate>>,
}

/// Input for restocking serialized units
#[derive(Debug, Deserialize, Validate)]
pub struct AddSerialsInput {
    #[validate(
        length(min = 1, message = "At least one serial is required."),
        custom = "valid_serials"
    )]
    pub serials: Vec<String>,
}

/// Sale metadata recorded against serials allocated outside a sale
#[derive(Debug, Default, Deserialize)]
pub struct AllocateSerialInput {
    pub sale_id: Option<i64>,
    pub customer_name: Option<String>,
    pub invoice_number: Option<String>,
}

impl From<AllocateSerialInput> for SerialSaleContext {
    fn from(input: AllocateSerialInput) -> Self {
        SerialSaleContext {
            sale_id: input.sale_id,
            customer_name: input.customer_name,
            invoice_number: input.invoice_number,
            date_sold: None,
        }
    }
}

/// Serials taken from a tool's pool
#[derive(Debug, Serialize)]
pub struct SerialAllocation {
    pub tool_id: Uuid,
    pub serials: Vec<String>,
    pub remaining_serials: usize,
}

/// Filters for tool listing
#[derive(Debug, Default, Deserialize)]
pub struct ToolFilter {
    pub category: Option<String>,
    pub search: Option<String>,
}

/// Input for creating an equipment type
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEquipmentTypeInput {
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,
    #[validate(custom = "non_negative")]
    pub default_cost: Decimal,
    #[validate(length(min = 1, message = "Category is required."))]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub invoice_number: Option<String>,
}

/// Input for updating an equipment type
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEquipmentTypeInput {
    #[validate(length(min = 1, message = "Name cannot be blank."))]
    pub name: Option<String>,
    #[validate(custom = "non_negative")]
    pub default_cost: Option<Decimal>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub invoice_number: Option<String>,
}

/// Input for creating or replacing a supplier
#[derive(Debug, Deserialize, Validate)]
pub struct SupplierInput {
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub address: Option<String>,
}

impl CatalogService {
    /// Create a new CatalogService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ------------------------------------------------------------------
    // Tools
    // ------------------------------------------------------------------

    /// List tools; customers only see enabled tools that are in stock
    pub async fn list_tools(
        &self,
        user: &AuthUser,
        filter: &ToolFilter,
        pagination: Pagination,
    ) -> AppResult<Vec<Tool>> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let records = sqlx::query_as::<_, ToolRecord>(&format!(
            r#"
            SELECT {}
            FROM tools
            WHERE ($1 = FALSE OR (is_enabled AND stock > 0))
              AND ($2::text IS NULL OR category = $2)
              AND ($3::text IS NULL OR name ILIKE $3 OR code ILIKE $3)
            ORDER BY date_added DESC
            LIMIT $4 OFFSET $5
            "#,
            TOOL_COLUMNS
        ))
        .bind(!user.is_admin_or_staff())
        .bind(&filter.category)
        .bind(search)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(records.into_iter().map(Tool::from).collect())
    }

    /// Get a tool by id
    pub async fn get_tool(&self, user: &AuthUser, tool_id: Uuid) -> AppResult<Tool> {
        let tool: Tool = sqlx::query_as::<_, ToolRecord>(&format!(
            "SELECT {} FROM tools WHERE id = $1",
            TOOL_COLUMNS
        ))
        .bind(tool_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tool".to_string()))?
        .into();

        if !user.is_admin_or_staff() && !tool.is_listed_for_customers() {
            return Err(AppError::NotFound("Tool".to_string()));
        }

        Ok(tool)
    }

    /// Create a tool
    pub async fn create_tool(&self, input: CreateToolInput) -> AppResult<Tool> {
        input.validate()?;
        if let Some(expiry) = input.expiry_date {
            validate_expiry_date(expiry, today())
                .map_err(|msg| AppError::validation("expiry_date", msg))?;
        }

        let stock = input.stock.unwrap_or(input.serials.len() as i32);

        let record = sqlx::query_as::<_, ToolRecord>(&format!(
            r#"
            INSERT INTO tools (
                name, code, category, description, cost, stock, status, is_enabled,
                supplier_id, equipment_type_id, invoice_number, set_size, expiry_date,
                available_serials, sold_serials
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, '[]'::jsonb)
            RETURNING {}
            "#,
            TOOL_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.category)
        .bind(&input.description)
        .bind(input.cost)
        .bind(stock)
        .bind(input.status.unwrap_or_default())
        .bind(input.is_enabled.unwrap_or(true))
        .bind(input.supplier_id)
        .bind(input.equipment_type_id)
        .bind(&input.invoice_number)
        .bind(input.set_size.unwrap_or_default())
        .bind(input.expiry_date)
        .bind(&input.serials)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "code"))?;

        tracing::info!(tool_id = %record.id, code = %record.code, stock, "Tool created");
        Ok(record.into())
    }

    /// Update a tool's catalog fields
    pub async fn update_tool(&self, tool_id: Uuid, input: UpdateToolInput) -> AppResult<Tool> {
        input.validate()?;
        if let Some(Some(expiry)) = input.expiry_date {
            validate_expiry_date(expiry, today())
                .map_err(|msg| AppError::validation("expiry_date", msg))?;
        }

        let mut tx = self.db.begin().await?;
        let mut tool = Self::lock_tool(&mut tx, tool_id).await?;

        if let Some(name) = input.name {
            tool.name = name;
        }
        if let Some(code) = input.code {
            tool.code = code;
        }
        if let Some(category) = input.category {
            tool.category = category;
        }
        if let Some(description) = input.description {
            tool.description = description;
        }
        if let Some(cost) = input.cost {
            tool.cost = cost;
        }
        if let Some(stock) = input.stock {
            tool.stock = stock;
        }
        if let Some(status) = input.status {
            tool.status = status;
        }
        if let Some(is_enabled) = input.is_enabled {
            tool.is_enabled = is_enabled;
        }
        if input.supplier_id.is_some() {
            tool.supplier_id = input.supplier_id;
        }
        if input.equipment_type_id.is_some() {
            tool.equipment_type_id = input.equipment_type_id;
        }
        if input.invoice_number.is_some() {
            tool.invoice_number = input.invoice_number;
        }
        if let Some(set_size) = input.set_size {
            tool.set_size = set_size;
        }
        if let Some(expiry) = input.expiry_date {
            tool.expiry_date = expiry;
        }

        let record = sqlx::query_as::<_, ToolRecord>(&format!(
            r#"
            UPDATE tools
            SET name = $1, code = $2, category = $3, description = $4, cost = $5,
                stock = $6, status = $7, is_enabled = $8, supplier_id = $9,
                equipment_type_id = $10, invoice_number = $11, set_size = $12,
                expiry_date = $13
            WHERE id = $14
            RETURNING {}
            "#,
            TOOL_COLUMNS
        ))
        .bind(&tool.name)
        .bind(&tool.code)
        .bind(&tool.category)
        .bind(&tool.description)
        .bind(tool.cost)
        .bind(tool.stock)
        .bind(tool.status)
        .bind(tool.is_enabled)
        .bind(tool.supplier_id)
        .bind(tool.equipment_type_id)
        .bind(&tool.invoice_number)
        .bind(tool.set_size)
        .bind(tool.expiry_date)
        .bind(tool.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "code"))?;

        tx.commit().await?;
        Ok(record.into())
    }

    /// Delete a tool
    pub async fn delete_tool(&self, tool_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM tools WHERE id = $1")
            .bind(tool_id)
            .execute(&self.db)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                    AppError::ValidationError(
                        "Tool has recorded sales and cannot be deleted; disable it instead."
                            .to_string(),
                    )
                }
                _ => AppError::DatabaseError(e),
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Tool".to_string()));
        }

        Ok(())
    }

    /// Restock a tool with new serialized units
    pub async fn add_serials(&self, tool_id: Uuid, input: AddSerialsInput) -> AppResult<Tool> {
        input.validate()?;

        let mut tx = self.db.begin().await?;
        let mut tool = Self::lock_tool(&mut tx, tool_id).await?;
        let added = tool.add_serials(input.serials)?;
        Self::store_inventory(&mut tx, &tool).await?;
        tx.commit().await?;

        tracing::info!(tool_id = %tool.id, added, stock = tool.stock, "Serials added");
        Ok(tool)
    }

    /// Move one random serial from the pool to sold
    pub async fn allocate_random_serial(
        &self,
        tool_id: Uuid,
        input: AllocateSerialInput,
    ) -> AppResult<SerialAllocation> {
        let context = SerialSaleContext::from(input);

        let mut tx = self.db.begin().await?;
        let mut tool = Self::lock_tool(&mut tx, tool_id).await?;
        let serial = tool
            .take_random_serial(&mut rand::thread_rng(), &context, today())
            .ok_or_else(|| InventoryError::SerialPoolExhausted {
                tool: tool.name.clone(),
            })?;
        Self::store_inventory(&mut tx, &tool).await?;
        tx.commit().await?;

        tracing::info!(tool_id = %tool.id, serial = %serial, "Random serial allocated");
        Ok(SerialAllocation {
            tool_id: tool.id,
            serials: vec![serial],
            remaining_serials: tool.available_serials.len(),
        })
    }

    /// Move a consecutive set of serials, sized by the tool's set size
    pub async fn allocate_serial_set(
        &self,
        tool_id: Uuid,
        input: AllocateSerialInput,
    ) -> AppResult<SerialAllocation> {
        let context = SerialSaleContext::from(input);

        let mut tx = self.db.begin().await?;
        let mut tool = Self::lock_tool(&mut tx, tool_id).await?;
        let serials = tool
            .take_serial_set(&mut rand::thread_rng(), &context, today())
            .ok_or_else(|| InventoryError::SerialPoolExhausted {
                tool: tool.name.clone(),
            })?;
        Self::store_inventory(&mut tx, &tool).await?;
        tx.commit().await?;

        tracing::info!(tool_id = %tool.id, units = serials.len(), "Serial set allocated");
        Ok(SerialAllocation {
            tool_id: tool.id,
            serials,
            remaining_serials: tool.available_serials.len(),
        })
    }

    /// Load a tool and hold its row lock for the rest of the transaction
    pub async fn lock_tool(conn: &mut PgConnection, tool_id: Uuid) -> AppResult<Tool> {
        let record = sqlx::query_as::<_, ToolRecord>(&format!(
            "SELECT {} FROM tools WHERE id = $1 FOR UPDATE",
            TOOL_COLUMNS
        ))
        .bind(tool_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Tool".to_string()))?;

        Ok(record.into())
    }

    /// Lock several tool rows at once, always in ascending id order, so two
    /// transactions touching the same tools never wait on each other in a cycle
    pub async fn lock_tools<I>(conn: &mut PgConnection, tool_ids: I) -> AppResult<()>
    where
        I: IntoIterator<Item = Uuid>,
    {
        let ids = lock_order(tool_ids);
        if ids.is_empty() {
            return Ok(());
        }

        sqlx::query("SELECT id FROM tools WHERE id = ANY($1) ORDER BY id FOR UPDATE")
            .bind(&ids)
            .fetch_all(&mut *conn)
            .await?;

        Ok(())
    }

    /// Write back a locked tool's stock and serial pools
    pub async fn store_inventory(conn: &mut PgConnection, tool: &Tool) -> AppResult<()> {
        // The stock >= 0 check constraint backs up the in-memory check
        let result = sqlx::query(
            r#"
            UPDATE tools
            SET stock = $1, available_serials = $2, sold_serials = $3
            WHERE id = $4
            "#,
        )
        .bind(tool.stock)
        .bind(&tool.available_serials)
        .bind(Json(&tool.sold_serials))
        .bind(tool.id)
        .execute(&mut *conn)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_check_violation() => {
                AppError::Inventory(InventoryError::OutOfStock {
                    tool: tool.name.clone(),
                })
            }
            _ => AppError::DatabaseError(e),
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Tool".to_string()));
        }

        Ok(())
    }

    /// Take one unit of a tool for a sale line item.
    ///
    /// The row is locked first and the decrement is conditional on
    /// `stock > 0`, so two concurrent sales cannot both take the last unit.
    pub async fn sell_unit(
        conn: &mut PgConnection,
        tool_id: Uuid,
        serial: Option<&str>,
        context: &SerialSaleContext,
    ) -> AppResult<Tool> {
        let mut tool = Self::lock_tool(&mut *conn, tool_id).await?;
        tool.sell_unit(serial, context, today())?;

        let result = sqlx::query(
            r#"
            UPDATE tools
            SET stock = stock - 1, available_serials = $1, sold_serials = $2
            WHERE id = $3 AND stock > 0
            "#,
        )
        .bind(&tool.available_serials)
        .bind(Json(&tool.sold_serials))
        .bind(tool.id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(InventoryError::OutOfStock { tool: tool.name }.into());
        }

        Ok(tool)
    }

    /// Return a previously sold unit to the shelf
    pub async fn release_unit(
        conn: &mut PgConnection,
        tool_id: Uuid,
        serial: Option<&str>,
    ) -> AppResult<()> {
        let mut tool = match Self::lock_tool(&mut *conn, tool_id).await {
            Ok(tool) => tool,
            Err(AppError::NotFound(_)) => {
                tracing::warn!(tool_id = %tool_id, "Released unit of a deleted tool");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if let Err(e) = tool.release_unit(serial) {
            // The serial was edited away from the sold list; restock the count only
            tracing::warn!(tool_id = %tool_id, error = %e, "Serial not found in sold list");
            tool.release_unit(None)?;
        }

        Self::store_inventory(conn, &tool).await
    }

    // ------------------------------------------------------------------
    // Equipment types
    // ------------------------------------------------------------------

    /// List equipment types
    pub async fn list_equipment_types(&self) -> AppResult<Vec<EquipmentType>> {
        let types = sqlx::query_as::<_, EquipmentType>(&format!(
            "SELECT {} FROM equipment_types ORDER BY category, name",
            EQUIPMENT_TYPE_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(types)
    }

    /// Get an equipment type
    pub async fn get_equipment_type(&self, id: Uuid) -> AppResult<EquipmentType> {
        sqlx::query_as::<_, EquipmentType>(&format!(
            "SELECT {} FROM equipment_types WHERE id = $1",
            EQUIPMENT_TYPE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Equipment type".to_string()))
    }

    /// Create an equipment type
    pub async fn create_equipment_type(
        &self,
        input: CreateEquipmentTypeInput,
    ) -> AppResult<EquipmentType> {
        input.validate()?;

        let equipment_type = sqlx::query_as::<_, EquipmentType>(&format!(
            r#"
            INSERT INTO equipment_types (name, default_cost, category, description, invoice_number)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            EQUIPMENT_TYPE_COLUMNS
        ))
        .bind(&input.name)
        .bind(input.default_cost)
        .bind(&input.category)
        .bind(&input.description)
        .bind(&input.invoice_number)
        .fetch_one(&self.db)
        .await?;

        Ok(equipment_type)
    }

    /// Update an equipment type
    pub async fn update_equipment_type(
        &self,
        id: Uuid,
        input: UpdateEquipmentTypeInput,
    ) -> AppResult<EquipmentType> {
        input.validate()?;

        let equipment_type = sqlx::query_as::<_, EquipmentType>(&format!(
            r#"
            UPDATE equipment_types
            SET name = COALESCE($1, name),
                default_cost = COALESCE($2, default_cost),
                category = COALESCE($3, category),
                description = COALESCE($4, description),
                invoice_number = COALESCE($5, invoice_number)
            WHERE id = $6
            RETURNING {}
            "#,
            EQUIPMENT_TYPE_COLUMNS
        ))
        .bind(&input.name)
        .bind(input.default_cost)
        .bind(&input.category)
        .bind(&input.description)
        .bind(&input.invoice_number)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Equipment type".to_string()))?;

        Ok(equipment_type)
    }

    /// Delete an equipment type
    pub async fn delete_equipment_type(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM equipment_types WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Equipment type".to_string()));
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Suppliers
    // ------------------------------------------------------------------

    /// List suppliers
    pub async fn list_suppliers(&self) -> AppResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {} FROM suppliers ORDER BY name",
            SUPPLIER_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(suppliers)
    }

    /// Get a supplier
    pub async fn get_supplier(&self, id: Uuid) -> AppResult<Supplier> {
        sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {} FROM suppliers WHERE id = $1",
            SUPPLIER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }

    /// Create a supplier
    pub async fn create_supplier(&self, input: SupplierInput) -> AppResult<Supplier> {
        input.validate()?;

        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            r#"
            INSERT INTO suppliers (name, contact_person, phone, email, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            SUPPLIER_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .fetch_one(&self.db)
        .await?;

        Ok(supplier)
    }

    /// Replace a supplier's details
    pub async fn update_supplier(&self, id: Uuid, input: SupplierInput) -> AppResult<Supplier> {
        input.validate()?;

        sqlx::query_as::<_, Supplier>(&format!(
            r#"
            UPDATE suppliers
            SET name = $1, contact_person = $2, phone = $3, email = $4, address = $5
            WHERE id = $6
            RETURNING {}
            "#,
            SUPPLIER_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }

    /// Delete a supplier
    pub async fn delete_supplier(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        Ok(())
    }
}
