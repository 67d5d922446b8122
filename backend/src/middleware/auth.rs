//! Authentication middleware
//!
//! JWT authentication and role-based access control

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{AppError, AppResult, ErrorDetail, ErrorResponse};
use crate::models::UserRole;
use crate::services::auth::AuthService;
use crate::AppState;

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_admin_or_staff(&self) -> bool {
        self.role.is_admin_or_staff()
    }

    /// Reject customers
    pub fn require_admin_or_staff(&self) -> AppResult<()> {
        if self.is_admin_or_staff() {
            Ok(())
        } else {
            Err(AppError::forbidden("Only admin or staff can perform this action."))
        }
    }

    /// Allow admin/staff, or the customer who owns the record
    pub fn require_owner_or_staff(&self, owner_id: i64) -> AppResult<()> {
        if self.role.can_access_owned(self.user_id, owner_id) {
            Ok(())
        } else {
            Err(AppError::forbidden("You do not have permission to access this record."))
        }
    }
}

/// Authentication middleware that validates bearer JWT access tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => return unauthorized_response("Missing or invalid Authorization header"),
    };

    let claims = match AuthService::decode_access_token(token, &state.config.jwt.secret) {
        Ok(claims) => claims,
        Err(_) => return unauthorized_response("Invalid or expired token"),
    };

    let user_id = match claims.sub.parse::<i64>() {
        Ok(id) => id,
        Err(_) => return unauthorized_response("Invalid user ID in token"),
    };

    request.extensions_mut().insert(AuthUser {
        user_id,
        email: claims.email,
        role: claims.role,
    });

    next.run(request).await
}

/// Create unauthorized response
fn unauthorized_response(message: &str) -> Response {
    let error = ErrorResponse {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            field: None,
        },
    };

    (StatusCode::UNAUTHORIZED, Json(error)).into_response()
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| unauthorized_response("Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> AuthUser {
        AuthUser {
            user_id: 7,
            email: "someone@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn customers_cannot_act_as_staff() {
        assert!(user(UserRole::Customer).require_admin_or_staff().is_err());
        assert!(user(UserRole::Staff).require_admin_or_staff().is_ok());
    }

    #[test]
    fn customers_reach_only_their_own_records() {
        assert!(user(UserRole::Customer).require_owner_or_staff(7).is_ok());
        assert!(user(UserRole::Customer).require_owner_or_staff(8).is_err());
        assert!(user(UserRole::Admin).require_owner_or_staff(8).is_ok());
    }
}
