//! Notification handlers

use axum::{extract::State, Json};
use serde_json::{json, Value};

use super::notification_service;
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::notification::SaleEmailInput;
use crate::AppState;

/// Send a sale email through the mail relay
pub async fn send_sale_email(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<SaleEmailInput>,
) -> Result<Json<Value>, AppError> {
    user.require_admin_or_staff()?;
    notification_service(&state).send_sale_email(input).await?;
    Ok(Json(json!({ "sent": true })))
}
