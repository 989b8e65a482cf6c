use axum::extract::Extension;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{ApiJson, ApiPath};
use crate::database::forum;
use crate::database::models::{DiscussionComment, DiscussionPost};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AppPool, AuthUser};

#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub approved: Option<bool>,
}

impl ApprovalRequest {
    fn approved(&self) -> Result<bool, ApiError> {
        self.approved
            .ok_or_else(|| ApiError::invalid_field("approved", "is required"))
    }
}

/// POST /api/admin/posts/:id/approval - publish or hide a post
pub async fn post_approval(
    ApiPath(post_id): ApiPath<Uuid>,
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<ApprovalRequest>,
) -> ApiResult<DiscussionPost> {
    let approved = payload.approved()?;

    if !forum::set_post_approval(&pool, post_id, approved).await? {
        return Err(ApiError::not_found(format!("Post {} not found", post_id)));
    }

    tracing::info!("Admin {} set approval of post {} to {}", auth_user.user_id, post_id, approved);

    let post = forum::find_post(&pool, post_id, auth_user.viewer())
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Post {} not found", post_id)))?;
    Ok(ApiResponse::success(post))
}

/// POST /api/admin/comments/:id/approval
pub async fn comment_approval(
    ApiPath(comment_id): ApiPath<Uuid>,
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<ApprovalRequest>,
) -> ApiResult<DiscussionComment> {
    let approved = payload.approved()?;

    if !forum::set_comment_approval(&pool, comment_id, approved).await? {
        return Err(ApiError::not_found(format!("Comment {} not found", comment_id)));
    }

    tracing::info!("Admin {} set approval of comment {} to {}", auth_user.user_id, comment_id, approved);

    let comment = forum::find_comment(&pool, comment_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Comment {} not found", comment_id)))?;
    Ok(ApiResponse::success(comment))
}
