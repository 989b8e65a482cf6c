use axum::extract::Extension;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{validate, ApiJson, ApiPath, ApiQuery, Page};
use crate::database::models::{Role, UserProfile};
use crate::database::profiles;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AppPool, AuthUser};

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub role: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: Option<String>,
}

/// GET /api/admin/users?role=
pub async fn users_get(
    ApiQuery(query): ApiQuery<UserListQuery>,
    Extension(AppPool(pool)): Extension<AppPool>,
) -> ApiResult<Vec<UserProfile>> {
    let role = validate::parse_optional_enum::<Role>("role", query.role.as_deref())?;
    let page = Page::from_query(query.limit, query.offset);

    let users = profiles::list(&pool, role, page.limit, page.offset).await?;
    Ok(ApiResponse::success(users))
}

/// PUT /api/admin/users/:id/role
pub async fn user_role_put(
    ApiPath(user_id): ApiPath<Uuid>,
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<RoleRequest>,
) -> ApiResult<UserProfile> {
    let role = validate::parse_optional_enum::<Role>("role", payload.role.as_deref())?
        .ok_or_else(|| ApiError::invalid_field("role", "is required"))?;

    if user_id == auth_user.user_id && role != Role::Admin {
        return Err(ApiError::bad_request("Admins cannot remove their own admin role"));
    }

    let mut tx = pool.begin().await?;
    profiles::set_role(&mut *tx, user_id, role).await?;
    tx.commit().await?;

    tracing::info!("Admin {} set role of {} to {}", auth_user.user_id, user_id, role);

    let profile = profiles::find(&pool, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Profile {} not found", user_id)))?;
    Ok(ApiResponse::success(profile))
}
