use sqlx::PgPool;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::SessionMessage;

const MESSAGE_COLUMNS: &str = "id, session_id, sender_id, recipient_id, content, is_read, created_at";

pub async fn create(
    pool: &PgPool,
    session_id: Uuid,
    sender_id: Uuid,
    recipient_id: Uuid,
    content: &str,
) -> Result<SessionMessage, DatabaseError> {
    let sql = format!(
        "INSERT INTO session_messages (id, session_id, sender_id, recipient_id, content)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {}",
        MESSAGE_COLUMNS
    );
    let message = sqlx::query_as::<_, SessionMessage>(&sql)
        .bind(Uuid::new_v4())
        .bind(session_id)
        .bind(sender_id)
        .bind(recipient_id)
        .bind(content)
        .fetch_one(pool)
        .await?;
    Ok(message)
}

/// Messages of a session in send order
pub async fn list_for_session(pool: &PgPool, session_id: Uuid) -> Result<Vec<SessionMessage>, DatabaseError> {
    let sql = format!(
        "SELECT {} FROM session_messages WHERE session_id = $1 ORDER BY created_at ASC, id",
        MESSAGE_COLUMNS
    );
    let messages = sqlx::query_as::<_, SessionMessage>(&sql)
        .bind(session_id)
        .fetch_all(pool)
        .await?;
    Ok(messages)
}

pub async fn find(pool: &PgPool, message_id: Uuid) -> Result<Option<SessionMessage>, DatabaseError> {
    let sql = format!("SELECT {} FROM session_messages WHERE id = $1", MESSAGE_COLUMNS);
    let message = sqlx::query_as::<_, SessionMessage>(&sql)
        .bind(message_id)
        .fetch_optional(pool)
        .await?;
    Ok(message)
}

/// Flip `is_read` on one message; only the recipient's row matches
pub async fn mark_read(
    pool: &PgPool,
    message_id: Uuid,
    recipient_id: Uuid,
) -> Result<Option<SessionMessage>, DatabaseError> {
    let sql = format!(
        "UPDATE session_messages SET is_read = true
         WHERE id = $1 AND recipient_id = $2
         RETURNING {}",
        MESSAGE_COLUMNS
    );
    let message = sqlx::query_as::<_, SessionMessage>(&sql)
        .bind(message_id)
        .bind(recipient_id)
        .fetch_optional(pool)
        .await?;
    Ok(message)
}

/// Mark every unread message addressed to `recipient_id` in a session as read
pub async fn mark_session_read(
    pool: &PgPool,
    session_id: Uuid,
    recipient_id: Uuid,
) -> Result<u64, DatabaseError> {
    let result = sqlx::query(
        "UPDATE session_messages SET is_read = true
         WHERE session_id = $1 AND recipient_id = $2 AND is_read = false",
    )
    .bind(session_id)
    .bind(recipient_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn unread_count(pool: &PgPool, recipient_id: Uuid) -> Result<i64, DatabaseError> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM session_messages WHERE recipient_id = $1 AND is_read = false",
    )
    .bind(recipient_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}
