use axum::extract::Extension;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::{validate, ApiJson, ApiPath};
use crate::database::messages;
use crate::database::models::{CounselingSession, SessionMessage};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AppPool, AuthUser};

use super::sessions::load_session;

const MAX_CONTENT: usize = 5000;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: Option<String>,
}

/// GET /api/sessions/:id/messages - in send order
pub async fn messages_get(
    ApiPath(session_id): ApiPath<Uuid>,
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Vec<SessionMessage>> {
    let session = load_session(&pool, session_id).await?;
    ensure_participant(&session, &auth_user)?;

    let messages = messages::list_for_session(&pool, session_id).await?;
    Ok(ApiResponse::success(messages))
}

/// POST /api/sessions/:id/messages - addressed to the other participant
pub async fn message_post(
    ApiPath(session_id): ApiPath<Uuid>,
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<SendMessageRequest>,
) -> ApiResult<SessionMessage> {
    let content = validate::required_text(payload.content.as_deref(), MAX_CONTENT)
        .map_err(|problem| ApiError::invalid_field("content", problem))?;

    let session = load_session(&pool, session_id).await?;
    let recipient_id = ensure_participant(&session, &auth_user)?;

    let message = messages::create(&pool, session_id, auth_user.user_id, recipient_id, &content).await?;
    tracing::debug!("Message {} sent in session {}", message.id, session_id);
    Ok(ApiResponse::created(message))
}

/// POST /api/sessions/:id/messages/read - everything addressed to the caller
pub async fn session_messages_read(
    ApiPath(session_id): ApiPath<Uuid>,
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let session = load_session(&pool, session_id).await?;
    ensure_participant(&session, &auth_user)?;

    let updated = messages::mark_session_read(&pool, session_id, auth_user.user_id).await?;
    Ok(ApiResponse::success(json!({ "sessionId": session_id, "updated": updated })))
}

/// POST /api/messages/:id/read - recipient only
pub async fn message_read(
    ApiPath(message_id): ApiPath<Uuid>,
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<SessionMessage> {
    let message = messages::find(&pool, message_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Message {} not found", message_id)))?;

    if message.recipient_id != auth_user.user_id {
        return Err(ApiError::forbidden("Only the recipient can mark a message as read"));
    }

    let message = messages::mark_read(&pool, message_id, auth_user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Message {} not found", message_id)))?;
    Ok(ApiResponse::success(message))
}

/// GET /api/messages/unread-count
pub async fn unread_count_get(
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let count = messages::unread_count(&pool, auth_user.user_id).await?;
    Ok(ApiResponse::success(json!({ "count": count })))
}

/// Returns the other participant's id
fn ensure_participant(session: &CounselingSession, auth_user: &AuthUser) -> Result<Uuid, ApiError> {
    session
        .counterpart_of(auth_user.user_id)
        .ok_or_else(|| ApiError::forbidden("You are not a participant in this session"))
}
