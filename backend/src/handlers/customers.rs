//! Customer and receivables handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::account_service;
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::{Customer, Pagination};
use crate::services::accounts::{ProvisionCustomerInput, ProvisionedCustomer};
use crate::services::receivables::{CreateCustomerInput, CustomerFilter, UpdateCustomerInput};
use crate::services::ReceivablesService;
use crate::AppState;

/// List customers
pub async fn list_customers(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<CustomerFilter>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<Customer>>, AppError> {
    user.require_admin_or_staff()?;
    let customers = ReceivablesService::new(state.db.clone())
        .list_customers(&filter, pagination)
        .await?;
    Ok(Json(customers))
}

/// Create a customer record without an account
pub async fn create_customer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateCustomerInput>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    user.require_admin_or_staff()?;
    let customer = ReceivablesService::new(state.db.clone())
        .create_customer(input)
        .await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// Create a customer account together with its customer record
pub async fn provision_customer(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Json(input): Json<ProvisionCustomerInput>,
) -> Result<(StatusCode, Json<ProvisionedCustomer>), AppError> {
    let provisioned = account_service(&state).provision_customer(input).await?;
    Ok((StatusCode::CREATED, Json(provisioned)))
}

/// Get a customer; customers may read their own record
pub async fn get_customer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(customer_id): Path<i64>,
) -> Result<Json<Customer>, AppError> {
    let customer = ReceivablesService::new(state.db.clone())
        .get_customer(customer_id)
        .await?;

    match customer.user_id {
        Some(owner) => user.require_owner_or_staff(owner)?,
        None => user.require_admin_or_staff()?,
    }

    Ok(Json(customer))
}

/// Update a customer and recompute its receivable
pub async fn update_customer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(customer_id): Path<i64>,
    Json(input): Json<UpdateCustomerInput>,
) -> Result<Json<Customer>, AppError> {
    user.require_admin_or_staff()?;
    let customer = ReceivablesService::new(state.db.clone())
        .update_customer(customer_id, input)
        .await?;
    Ok(Json(customer))
}

/// Delete a customer
pub async fn delete_customer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(customer_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    user.require_admin_or_staff()?;
    ReceivablesService::new(state.db.clone())
        .delete_customer(customer_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create and link an account for an existing customer
pub async fn provision_customer_account(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(customer_id): Path<i64>,
) -> Result<(StatusCode, Json<ProvisionedCustomer>), AppError> {
    user.require_admin_or_staff()?;
    let provisioned = account_service(&state)
        .provision_account_for_customer(customer_id)
        .await?;
    Ok((StatusCode::CREATED, Json(provisioned)))
}
