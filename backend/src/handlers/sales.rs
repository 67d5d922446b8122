//! Sales handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::{Pagination, Sale};
use crate::services::sales::{CreateSaleInput, UpdateSaleInput};
use crate::services::SalesService;
use crate::AppState;

/// List sales visible to the caller
pub async fn list_sales(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<Sale>>, AppError> {
    let sales = SalesService::new(state.db.clone())
        .list_sales(&user, pagination)
        .await?;
    Ok(Json(sales))
}

/// Record a sale
pub async fn create_sale(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateSaleInput>,
) -> Result<(StatusCode, Json<Sale>), AppError> {
    let sale = SalesService::new(state.db.clone())
        .create_sale(&user, input)
        .await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

pub async fn get_sale(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sale_id): Path<i64>,
) -> Result<Json<Sale>, AppError> {
    let sale = SalesService::new(state.db.clone())
        .get_sale(&user, sale_id)
        .await?;
    Ok(Json(sale))
}

pub async fn update_sale(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sale_id): Path<i64>,
    Json(input): Json<UpdateSaleInput>,
) -> Result<Json<Sale>, AppError> {
    let sale = SalesService::new(state.db.clone())
        .update_sale(&user, sale_id, input)
        .await?;
    Ok(Json(sale))
}

/// Delete a sale and return its units to stock
pub async fn delete_sale(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sale_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    SalesService::new(state.db.clone())
        .delete_sale(&user, sale_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
