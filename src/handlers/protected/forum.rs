use axum::extract::Extension;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::{json::double_option, validate, ApiJson, ApiPath, ApiQuery, FieldErrors, Page};
use crate::config;
use crate::database::forum;
use crate::database::models::{DiscussionComment, DiscussionPost};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AppPool, AuthUser};

const MAX_TITLE: usize = 200;
const MAX_POST: usize = 10_000;
const MAX_COMMENT: usize = 5000;
const MAX_CATEGORY: usize = 50;

#[derive(Debug, Deserialize)]
pub struct PostListQuery {
    pub category: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostWithComments {
    pub post: DiscussionPost,
    pub comments: Vec<DiscussionComment>,
}

/// GET /api/posts - approved posts plus the caller's own; admins see all
pub async fn posts_get(
    ApiQuery(query): ApiQuery<PostListQuery>,
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Vec<DiscussionPost>> {
    let page = Page::from_query(query.limit, query.offset);
    let category = query.category.as_deref().map(str::trim).filter(|c| !c.is_empty());

    let posts = forum::list_visible(&pool, auth_user.viewer(), category, page.limit, page.offset).await?;
    Ok(ApiResponse::success(posts))
}

/// POST /api/posts
pub async fn post_post(
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<CreatePostRequest>,
) -> ApiResult<DiscussionPost> {
    let mut errors = FieldErrors::new();
    let title = errors.check("title", validate::required_text(payload.title.as_deref(), MAX_TITLE));
    let content = errors.check("content", validate::required_text(payload.content.as_deref(), MAX_POST));
    let category = errors
        .check("category", validate::optional_text(payload.category.as_deref(), MAX_CATEGORY))
        .flatten();
    errors.into_result()?;

    let (Some(title), Some(content)) = (title, content) else {
        return Err(ApiError::bad_request("Invalid post"));
    };

    let post = forum::create_post(
        &pool,
        auth_user.viewer(),
        &title,
        &content,
        category.as_deref(),
        starts_approved(&auth_user),
    )
    .await?;

    if !post.is_approved {
        tracing::info!("Post {} by {} awaits moderation", post.id, auth_user.user_id);
    }
    Ok(ApiResponse::created(post))
}

/// GET /api/posts/:id - the post with its visible comments
pub async fn post_show(
    ApiPath(post_id): ApiPath<Uuid>,
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<PostWithComments> {
    let post = load_visible_post(&pool, post_id, &auth_user).await?;
    let comments = forum::list_visible_comments(&pool, post_id, auth_user.viewer()).await?;
    Ok(ApiResponse::success(PostWithComments { post, comments }))
}

/// PUT /api/posts/:id - author only
pub async fn post_put(
    ApiPath(post_id): ApiPath<Uuid>,
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<UpdatePostRequest>,
) -> ApiResult<DiscussionPost> {
    let post = load_visible_post(&pool, post_id, &auth_user).await?;
    if post.user_id != auth_user.user_id {
        return Err(ApiError::forbidden("Only the author can edit this post"));
    }

    let mut errors = FieldErrors::new();
    let title = match payload.title {
        Some(title) => errors.check("title", validate::required_text(Some(&title), MAX_TITLE)),
        None => Some(post.title),
    };
    let content = match payload.content {
        Some(content) => errors.check("content", validate::required_text(Some(&content), MAX_POST)),
        None => Some(post.content),
    };
    let category = match payload.category {
        None => post.category,
        Some(category) => errors
            .check("category", validate::optional_text(category.as_deref(), MAX_CATEGORY))
            .flatten(),
    };
    errors.into_result()?;

    let (Some(title), Some(content)) = (title, content) else {
        return Err(ApiError::bad_request("Invalid post"));
    };

    let post = forum::update_post(&pool, post_id, auth_user.viewer(), &title, &content, category.as_deref()).await?;
    Ok(ApiResponse::success(post))
}

/// DELETE /api/posts/:id - author or admin; comments are removed first
pub async fn post_delete(
    ApiPath(post_id): ApiPath<Uuid>,
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let post = load_visible_post(&pool, post_id, &auth_user).await?;
    if post.user_id != auth_user.user_id && !auth_user.is_admin() {
        return Err(ApiError::forbidden("Only the author can delete this post"));
    }

    let mut tx = pool.begin().await?;
    let comments_deleted = forum::delete_post_with_comments(&mut *tx, post_id).await?;
    tx.commit().await?;

    tracing::info!("Post {} deleted by {} with {} comments", post_id, auth_user.user_id, comments_deleted);
    Ok(ApiResponse::success(json!({
        "id": post_id,
        "deleted": true,
        "commentsDeleted": comments_deleted
    })))
}

/// POST /api/posts/:id/comments
pub async fn comment_post(
    ApiPath(post_id): ApiPath<Uuid>,
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<CreateCommentRequest>,
) -> ApiResult<DiscussionComment> {
    let content = validate::required_text(payload.content.as_deref(), MAX_COMMENT)
        .map_err(|problem| ApiError::invalid_field("content", problem))?;

    load_visible_post(&pool, post_id, &auth_user).await?;

    let comment =
        forum::create_comment(&pool, post_id, auth_user.user_id, &content, starts_approved(&auth_user)).await?;
    Ok(ApiResponse::created(comment))
}

/// DELETE /api/comments/:id - author or admin
pub async fn comment_delete(
    ApiPath(comment_id): ApiPath<Uuid>,
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let comment = forum::find_comment(&pool, comment_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Comment {} not found", comment_id)))?;

    if comment.user_id != auth_user.user_id && !auth_user.is_admin() {
        return Err(ApiError::forbidden("Only the author can delete this comment"));
    }

    if !forum::delete_comment(&pool, comment_id, comment.user_id).await? {
        return Err(ApiError::not_found(format!("Comment {} not found", comment_id)));
    }
    Ok(ApiResponse::success(json!({ "id": comment_id, "deleted": true })))
}

/// Unapproved posts are hidden from everyone except their author and admins
async fn load_visible_post(pool: &PgPool, post_id: Uuid, auth_user: &AuthUser) -> Result<DiscussionPost, ApiError> {
    forum::find_post(pool, post_id, auth_user.viewer())
        .await?
        .filter(|post| post.is_visible_to(auth_user.user_id) || auth_user.is_admin())
        .ok_or_else(|| ApiError::not_found(format!("Post {} not found", post_id)))
}

fn starts_approved(auth_user: &AuthUser) -> bool {
    !config::config().forum.require_post_approval || auth_user.is_admin()
}
