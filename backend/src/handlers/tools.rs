//! Tool catalog and serial pool handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::{Pagination, Tool};
use crate::services::catalog::{
    AddSerialsInput, AllocateSerialInput, CreateToolInput, SerialAllocation, ToolFilter,
    UpdateToolInput,
};
use crate::services::CatalogService;
use crate::AppState;

/// List tools visible to the caller
pub async fn list_tools(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<ToolFilter>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<Tool>>, AppError> {
    let tools = CatalogService::new(state.db.clone())
        .list_tools(&user, &filter, pagination)
        .await?;
    Ok(Json(tools))
}

/// Get a tool
pub async fn get_tool(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(tool_id): Path<Uuid>,
) -> Result<Json<Tool>, AppError> {
    let tool = CatalogService::new(state.db.clone())
        .get_tool(&user, tool_id)
        .await?;
    Ok(Json(tool))
}

/// Create a tool
pub async fn create_tool(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateToolInput>,
) -> Result<(StatusCode, Json<Tool>), AppError> {
    if !user.role.can_manage_catalog() {
        return Err(AppError::forbidden("Customers cannot add tools."));
    }
    let tool = CatalogService::new(state.db.clone()).create_tool(input).await?;
    Ok((StatusCode::CREATED, Json(tool)))
}

/// Update a tool
pub async fn update_tool(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(tool_id): Path<Uuid>,
    Json(input): Json<UpdateToolInput>,
) -> Result<Json<Tool>, AppError> {
    user.require_admin_or_staff()?;
    let tool = CatalogService::new(state.db.clone())
        .update_tool(tool_id, input)
        .await?;
    Ok(Json(tool))
}

/// Delete a tool
pub async fn delete_tool(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(tool_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    user.require_admin_or_staff()?;
    CatalogService::new(state.db.clone())
        .delete_tool(tool_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Restock a tool with serialized units
pub async fn add_tool_serials(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(tool_id): Path<Uuid>,
    Json(input): Json<AddSerialsInput>,
) -> Result<Json<Tool>, AppError> {
    user.require_admin_or_staff()?;
    let tool = CatalogService::new(state.db.clone())
        .add_serials(tool_id, input)
        .await?;
    Ok(Json(tool))
}

/// Allocate one random serial
pub async fn allocate_random_serial(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(tool_id): Path<Uuid>,
    input: Option<Json<AllocateSerialInput>>,
) -> Result<Json<SerialAllocation>, AppError> {
    user.require_admin_or_staff()?;
    let input = input.map(|Json(input)| input).unwrap_or_default();
    let allocation = CatalogService::new(state.db.clone())
        .allocate_random_serial(tool_id, input)
        .await?;
    Ok(Json(allocation))
}

/// Allocate a consecutive serial set sized by the tool's set size
pub async fn allocate_serial_set(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(tool_id): Path<Uuid>,
    input: Option<Json<AllocateSerialInput>>,
) -> Result<Json<SerialAllocation>, AppError> {
    user.require_admin_or_staff()?;
    let input = input.map(|Json(input)| input).unwrap_or_default();
    let allocation = CatalogService::new(state.db.clone())
        .allocate_serial_set(tool_id, input)
        .await?;
    Ok(Json(allocation))
}
