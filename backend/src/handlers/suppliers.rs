//! Supplier handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::Supplier;
use crate::services::catalog::SupplierInput;
use crate::services::CatalogService;
use crate::AppState;

pub async fn list_suppliers(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<Vec<Supplier>>, AppError> {
    let suppliers = CatalogService::new(state.db.clone()).list_suppliers().await?;
    Ok(Json(suppliers))
}

pub async fn get_supplier(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Supplier>, AppError> {
    let supplier = CatalogService::new(state.db.clone()).get_supplier(id).await?;
    Ok(Json(supplier))
}

pub async fn create_supplier(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<SupplierInput>,
) -> Result<(StatusCode, Json<Supplier>), AppError> {
    user.require_admin_or_staff()?;
    let supplier = CatalogService::new(state.db.clone())
        .create_supplier(input)
        .await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn update_supplier(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<SupplierInput>,
) -> Result<Json<Supplier>, AppError> {
    user.require_admin_or_staff()?;
    let supplier = CatalogService::new(state.db.clone())
        .update_supplier(id, input)
        .await?;
    Ok(Json(supplier))
}

pub async fn delete_supplier(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    user.require_admin_or_staff()?;
    CatalogService::new(state.db.clone())
        .delete_supplier(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
