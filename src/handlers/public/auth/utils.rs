use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::auth::{self, Claims};
use crate::database::{accounts, models::{Role, UserProfile}};
use crate::error::ApiError;

/// Bearer token handed to the client
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub user: UserProfile,
    pub session: SessionToken,
}

/// Record an `auth_sessions` row and sign a token that references it.
/// Runs on the caller's transaction so a signing failure leaves no row behind.
pub async fn issue_session(conn: &mut PgConnection, user_id: Uuid, role: Role) -> Result<SessionToken, ApiError> {
    let session = accounts::create_session(conn, user_id, auth::session_expiry()).await?;
    let claims = Claims::new(user_id, session.id, role, session.expires_at);
    let access_token = auth::generate_jwt(&claims)?;

    Ok(SessionToken {
        access_token,
        token_type: "Bearer",
        expires_at: session.expires_at,
    })
}

/// bcrypt is CPU-bound, keep it off the async workers
pub async fn hash_password_blocking(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || auth::hash_password(&password))
        .await
        .map_err(|e| {
            tracing::error!("Password hashing task failed: {}", e);
            ApiError::internal_server_error("An error occurred while processing your request")
        })?
        .map_err(ApiError::from)
}

/// Unknown accounts pay for a verification too
pub async fn verify_against_dummy_blocking(password: String) -> Result<(), ApiError> {
    tokio::task::spawn_blocking(move || auth::verify_against_dummy(&password))
        .await
        .map_err(|e| {
            tracing::error!("Password verification task failed: {}", e);
            ApiError::internal_server_error("An error occurred while processing your request")
        })
}

pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || auth::verify_password(&password, &hash))
        .await
        .map_err(|e| {
            tracing::error!("Password verification task failed: {}", e);
            ApiError::internal_server_error("An error occurred while processing your request")
        })
}
