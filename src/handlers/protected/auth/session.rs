use axum::extract::Extension;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::{accounts, models::UserProfile, profiles};
use crate::error::ApiError;
use crate::handlers::public::auth::utils::{issue_session, SessionToken};
use crate::middleware::{ApiResponse, ApiResult, AppPool, AuthUser};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub user: UserProfile,
    pub session: SessionInfo,
}

/// GET /api/auth/whoami
pub async fn session_whoami(
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<WhoAmI> {
    let user = profiles::find(&pool, auth_user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    Ok(ApiResponse::success(WhoAmI {
        user,
        session: SessionInfo {
            id: auth_user.session_id,
            expires_at: auth_user.expires_at,
        },
    }))
}

/// PUT /api/auth/session/refresh - revoke the current session and issue a new one
pub async fn session_refresh(
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<SessionToken> {
    let mut tx = pool.begin().await?;

    if !accounts::revoke_session(&mut *tx, auth_user.session_id).await? {
        // Another request rotated or revoked it first
        return Err(ApiError::unauthorized("Session expired or revoked"));
    }
    let session = issue_session(&mut *tx, auth_user.user_id, auth_user.role).await?;
    tx.commit().await?;

    tracing::debug!("Rotated session {} for user {}", auth_user.session_id, auth_user.user_id);
    Ok(ApiResponse::success(session))
}

/// DELETE /api/auth/session - sign out
pub async fn session_signout(
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let mut conn = pool.acquire().await?;
    let revoked = accounts::revoke_session(&mut *conn, auth_user.session_id).await?;

    tracing::info!("User {} signed out", auth_user.user_id);
    Ok(ApiResponse::success(json!({ "signedOut": revoked })))
}
