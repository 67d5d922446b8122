//! Dashboard handlers

use axum::{extract::State, Json};

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::DashboardSummary;
use crate::services::DashboardService;
use crate::AppState;

/// Back-office summary figures
pub async fn dashboard_summary(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<DashboardSummary>, AppError> {
    user.require_admin_or_staff()?;
    let summary = DashboardService::new(state.db.clone()).summary().await?;
    Ok(Json(summary))
}
