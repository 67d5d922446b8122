//! Payment handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::{Pagination, Payment};
use crate::services::payments::{CreatePaymentInput, UpdatePaymentInput};
use crate::services::PaymentService;
use crate::AppState;

pub async fn list_payments(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<Payment>>, AppError> {
    let payments = PaymentService::new(state.db.clone())
        .list_payments(&user, pagination)
        .await?;
    Ok(Json(payments))
}

/// Record a payment; a linked sale is marked completed
pub async fn create_payment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreatePaymentInput>,
) -> Result<(StatusCode, Json<Payment>), AppError> {
    let payment = PaymentService::new(state.db.clone())
        .create_payment(&user, input)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn get_payment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(payment_id): Path<i64>,
) -> Result<Json<Payment>, AppError> {
    let payment = PaymentService::new(state.db.clone())
        .get_payment(&user, payment_id)
        .await?;
    Ok(Json(payment))
}

pub async fn update_payment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(payment_id): Path<i64>,
    Json(input): Json<UpdatePaymentInput>,
) -> Result<Json<Payment>, AppError> {
    let payment = PaymentService::new(state.db.clone())
        .update_payment(&user, payment_id, input)
        .await?;
    Ok(Json(payment))
}

pub async fn delete_payment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(payment_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    PaymentService::new(state.db.clone())
        .delete_payment(&user, payment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
