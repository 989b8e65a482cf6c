use serde::Deserialize;

use crate::api::{ApiJson, FieldErrors};
use crate::auth;
use crate::database::{accounts, profiles, DatabaseManager};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

use super::utils::{issue_session, verify_against_dummy_blocking, verify_password_blocking, AuthPayload};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /auth/signin - exchange credentials for a session token
pub async fn signin_post(ApiJson(payload): ApiJson<SigninRequest>) -> ApiResult<AuthPayload> {
    let email = auth::normalize_email(payload.email.as_deref().unwrap_or_default());
    let password = payload.password.unwrap_or_default();

    let mut errors = FieldErrors::new();
    if email.is_empty() {
        errors.add("email", "is required");
    }
    if password.is_empty() {
        errors.add("password", "is required");
    }
    errors.into_result()?;

    let pool = DatabaseManager::pool().await?;

    let Some(account) = accounts::find_by_email(&pool, &email).await? else {
        verify_against_dummy_blocking(password).await?;
        tracing::warn!("Sign-in failed: unknown email");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    if !verify_password_blocking(password, account.password_hash.clone()).await? {
        tracing::warn!("Sign-in failed: bad password for {}", account.id);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let user = profiles::find(&pool, account.id)
        .await?
        .ok_or_else(|| ApiError::internal_server_error("Account has no profile"))?;

    let mut tx = pool.begin().await?;
    let session = issue_session(&mut *tx, account.id, user.role).await?;
    tx.commit().await?;

    tracing::info!("User {} signed in", account.id);
    Ok(ApiResponse::success(AuthPayload { user, session }))
}
