use axum::{extract::Request, middleware::Next, response::Response};

use super::auth::AuthUser;
use crate::error::ApiError;

/// Gate for `/api/admin/*`. Runs after session validation.
pub async fn require_admin_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.is_admin() {
        tracing::warn!("User {} ({}) denied admin route {}", user.user_id, user.role, request.uri().path());
        return Err(ApiError::forbidden("Admin role required"));
    }

    Ok(next.run(request).await)
}
