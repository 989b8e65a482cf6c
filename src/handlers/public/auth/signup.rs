use serde::Deserialize;

use crate::api::{validate, ApiJson, FieldErrors};
use crate::auth;
use crate::config;
use crate::database::{accounts, models::Role, profiles, DatabaseError, DatabaseManager};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

use super::utils::{hash_password_blocking, issue_session, AuthPayload};

const MAX_DISPLAY_NAME: usize = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub display_name: Option<String>,
}

/// POST /auth/signup - create an account with a patient profile and sign in
pub async fn signup_post(ApiJson(payload): ApiJson<SignupRequest>) -> ApiResult<AuthPayload> {
    if !config::config().security.allow_registration {
        return Err(ApiError::forbidden("Registration is disabled"));
    }

    let mut errors = FieldErrors::new();
    let email = auth::normalize_email(payload.email.as_deref().unwrap_or_default());
    errors.check("email", auth::validate_email_format(&email));
    let password = payload.password.unwrap_or_default();
    errors.check("password", auth::validate_password(&password));
    let display_name = errors
        .check("displayName", validate::optional_text(payload.display_name.as_deref(), MAX_DISPLAY_NAME))
        .flatten();
    errors.into_result()?;

    let display_name = display_name.unwrap_or_else(|| default_display_name(&email));

    let pool = DatabaseManager::pool().await?;
    let password_hash = hash_password_blocking(password).await?;

    let mut tx = pool.begin().await?;
    let account = accounts::create_user(&mut *tx, &email, &password_hash, &display_name, Role::Patient)
        .await
        .map_err(|e| match e {
            DatabaseError::UniqueViolation(_) => ApiError::conflict("An account with this email already exists"),
            other => other.into(),
        })?;
    let session = issue_session(&mut *tx, account.id, Role::Patient).await?;
    tx.commit().await?;

    let user = profiles::find(&pool, account.id)
        .await?
        .ok_or_else(|| ApiError::internal_server_error("Profile missing after sign-up"))?;

    tracing::info!("New account {} registered", account.id);
    Ok(ApiResponse::created(AuthPayload { user, session }))
}

fn default_display_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_local_part() {
        assert_eq!(default_display_name("sam.lee@example.com"), "sam.lee");
    }
}
