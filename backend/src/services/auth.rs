//! Authentication service for login and token management

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use bcrypt::verify;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared::normalize_email;
use sqlx::PgPool;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{User, UserRole};
use crate::services::receivables::{CustomerDraft, ReceivablesService};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub email: String,
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
}

/// Login result: token pair plus the user profile
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: User,
}

/// Authentication tokens
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access: String,
    pub refresh: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// User info from database
#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    #[sqlx(flatten)]
    pub user: User,
    pub password_hash: String,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
        }
    }

    /// Authenticate user with email and password
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginResponse> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AppError::ValidationError(
                "Email and password are required.".to_string(),
            ));
        }

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, phone, role, is_active, created_at, password_hash
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(password, &row.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        let user = row.user;
        if !user.is_active {
            return Err(AppError::AccountDisabled);
        }

        if user.role == UserRole::Customer {
            self.activate_customer(&user).await?;
        }

        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(&self.db)
            .await?;

        let tokens = self.issue_tokens(&user).await?;
        tracing::info!(user_id = user.id, role = %user.role, "User logged in");

        Ok(LoginResponse {
            access: tokens.access,
            refresh: tokens.refresh,
            user,
        })
    }

    /// Refresh access token using refresh token
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        let token_hash = Self::hash_token(refresh_token);

        // Revoking and reading in one statement lets only one caller rotate a token
        let user = sqlx::query_as::<_, User>(
            r#"
            WITH revoked AS (
                UPDATE refresh_tokens
                SET revoked_at = NOW()
                WHERE token_hash = $1
                  AND revoked_at IS NULL
                  AND expires_at > NOW()
                RETURNING user_id
            )
            SELECT u.id, u.email, u.name, u.phone, u.role, u.is_active, u.created_at
            FROM revoked
            JOIN users u ON u.id = revoked.user_id
            WHERE u.is_active = true
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidToken)?;

        self.issue_tokens(&user).await
    }

    /// Decode and validate an access token
    pub fn decode_access_token(token: &str, secret: &str) -> AppResult<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidToken)
    }

    /// Mark the customer record behind a customer account as activated,
    /// creating it on first login when the account has none
    async fn activate_customer(&self, user: &User) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let activated = sqlx::query(
            "UPDATE customers SET is_activated = TRUE, updated_at = NOW() WHERE user_id = $1",
        )
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

        if activated.rows_affected() == 0 {
            let draft = CustomerDraft {
                user_id: Some(user.id),
                name: user.name.clone(),
                phone: user.phone.clone(),
                email: Some(user.email.clone()),
                state: None,
                is_activated: true,
                ..CustomerDraft::default()
            };
            let customer = ReceivablesService::insert_customer(&mut tx, &draft).await?;
            tracing::info!(
                user_id = user.id,
                customer_id = customer.id,
                "Created customer record on first login"
            );
        }

        tx.commit().await?;
        Ok(())
    }

    /// Generate and persist a fresh token pair
    async fn issue_tokens(&self, user: &User) -> AppResult<AuthTokens> {
        let tokens = self.generate_tokens(user)?;
        self.store_refresh_token(user.id, &tokens.refresh).await?;
        Ok(tokens)
    }

    /// Generate access and refresh tokens
    fn generate_tokens(&self, user: &User) -> AppResult<AuthTokens> {
        let now = Utc::now();
        let access_exp = now + Duration::seconds(self.access_token_expiry);

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            exp: access_exp.timestamp(),
            iat: now.timestamp(),
        };

        let access = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        // Refresh token is opaque; only its hash is stored
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let refresh = URL_SAFE_NO_PAD.encode(bytes);

        Ok(AuthTokens {
            access,
            refresh,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    /// Store refresh token in database
    async fn store_refresh_token(&self, user_id: i64, token: &str) -> AppResult<()> {
        let token_hash = Self::hash_token(token);
        let expires_at = Utc::now() + Duration::seconds(self.refresh_token_expiry);

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(&token_hash)
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Hash a token for storage
    fn hash_token(token: &str) -> String {
        let digest = Sha256::digest(token.as_bytes());
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }
}
