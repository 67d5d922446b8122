//! Equipment type handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::EquipmentType;
use crate::services::catalog::{CreateEquipmentTypeInput, UpdateEquipmentTypeInput};
use crate::services::CatalogService;
use crate::AppState;

pub async fn list_equipment_types(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<Vec<EquipmentType>>, AppError> {
    let types = CatalogService::new(state.db.clone())
        .list_equipment_types()
        .await?;
    Ok(Json(types))
}

pub async fn get_equipment_type(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<EquipmentType>, AppError> {
    let equipment_type = CatalogService::new(state.db.clone())
        .get_equipment_type(id)
        .await?;
    Ok(Json(equipment_type))
}

pub async fn create_equipment_type(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateEquipmentTypeInput>,
) -> Result<(StatusCode, Json<EquipmentType>), AppError> {
    user.require_admin_or_staff()?;
    let equipment_type = CatalogService::new(state.db.clone())
        .create_equipment_type(input)
        .await?;
    Ok((StatusCode::CREATED, Json(equipment_type)))
}

pub async fn update_equipment_type(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateEquipmentTypeInput>,
) -> Result<Json<EquipmentType>, AppError> {
    user.require_admin_or_staff()?;
    let equipment_type = CatalogService::new(state.db.clone())
        .update_equipment_type(id, input)
        .await?;
    Ok(Json(equipment_type))
}

pub async fn delete_equipment_type(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    user.require_admin_or_staff()?;
    CatalogService::new(state.db.clone())
        .delete_equipment_type(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
