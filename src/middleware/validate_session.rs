use axum::{extract::Request, middleware::Next, response::Response};
use sqlx::PgPool;

use super::auth::{claims_of, AuthUser};
use crate::database::{accounts, DatabaseManager};
use crate::error::ApiError;

/// Application pool handed to protected handlers
#[derive(Clone)]
pub struct AppPool(pub PgPool);

/// Checks that the token's session row is still active and loads the
/// caller's current role. Revoked or expired sessions get 401.
pub async fn validate_session_middleware(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let claims = claims_of(&request)
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let pool = DatabaseManager::pool().await?;

    let (session, role, display_name) = accounts::find_active_session(&pool, claims.sid, claims.sub)
        .await?
        .ok_or_else(|| {
            tracing::info!("Session {} for user {} is no longer active", claims.sid, claims.sub);
            ApiError::unauthorized("Session expired or revoked")
        })?;

    let auth_user = AuthUser {
        user_id: session.user_id,
        session_id: session.id,
        role,
        display_name,
        expires_at: session.expires_at,
    };

    request.extensions_mut().insert(AppPool(pool));
    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}
