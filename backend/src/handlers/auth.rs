//! Authentication and staff account handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::account_service;
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::{Pagination, User};
use crate::services::accounts::ProvisionStaffInput;
use crate::services::auth::{AuthTokens, LoginResponse};
use crate::services::AuthService;
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let response = auth_service.login(&body.email, &body.password).await?;
    Ok(Json(response))
}

/// Refresh token endpoint handler
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<AuthTokens>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let tokens = auth_service.refresh_token(&body.refresh).await?;
    Ok(Json(tokens))
}

/// Create a staff account
pub async fn provision_staff(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<ProvisionStaffInput>,
) -> Result<(StatusCode, Json<User>), AppError> {
    if !user.role.can_manage_staff() {
        return Err(AppError::forbidden("Only admin or staff can create staff accounts."));
    }
    let staff = account_service(&state).provision_staff(input).await?;
    Ok((StatusCode::CREATED, Json(staff)))
}

/// List staff accounts
pub async fn list_staff(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<User>>, AppError> {
    user.require_admin_or_staff()?;
    let staff = account_service(&state).list_staff(pagination).await?;
    Ok(Json(staff))
}
