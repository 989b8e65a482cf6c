use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{CounselingSession, SessionStatus, SessionType};

const SESSION_COLUMNS: &str = "id, counselor_id, patient_id, title, session_type, status,
    scheduled_for, duration_minutes, notes, created_at, updated_at";

pub struct NewSession<'a> {
    pub counselor_id: Uuid,
    pub patient_id: Uuid,
    pub title: Option<&'a str>,
    pub session_type: SessionType,
    pub status: SessionStatus,
    pub scheduled_for: DateTime<Utc>,
    pub duration_minutes: i32,
    pub notes: Option<&'a str>,
}

pub async fn create(pool: &PgPool, new: NewSession<'_>) -> Result<CounselingSession, DatabaseError> {
    let sql = format!(
        "INSERT INTO counseling_sessions
            (id, counselor_id, patient_id, title, session_type, status, scheduled_for, duration_minutes, notes)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING {}",
        SESSION_COLUMNS
    );
    let session = sqlx::query_as::<_, CounselingSession>(&sql)
        .bind(Uuid::new_v4())
        .bind(new.counselor_id)
        .bind(new.patient_id)
        .bind(new.title)
        .bind(new.session_type.as_str())
        .bind(new.status.as_str())
        .bind(new.scheduled_for)
        .bind(new.duration_minutes)
        .bind(new.notes)
        .fetch_one(pool)
        .await?;
    Ok(session)
}

pub async fn find(pool: &PgPool, session_id: Uuid) -> Result<Option<CounselingSession>, DatabaseError> {
    let sql = format!("SELECT {} FROM counseling_sessions WHERE id = $1", SESSION_COLUMNS);
    let session = sqlx::query_as::<_, CounselingSession>(&sql)
        .bind(session_id)
        .fetch_optional(pool)
        .await?;
    Ok(session)
}

/// Lock the session row for a read-check-write inside the caller's transaction
pub async fn find_for_update(
    conn: &mut PgConnection,
    session_id: Uuid,
) -> Result<Option<CounselingSession>, DatabaseError> {
    let sql = format!("SELECT {} FROM counseling_sessions WHERE id = $1 FOR UPDATE", SESSION_COLUMNS);
    let session = sqlx::query_as::<_, CounselingSession>(&sql)
        .bind(session_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(session)
}

/// Sessions ordered by schedule. `participant` restricts to sessions the user takes part in.
pub async fn list(
    pool: &PgPool,
    participant: Option<Uuid>,
    status: Option<SessionStatus>,
    limit: i64,
    offset: i64,
) -> Result<Vec<CounselingSession>, DatabaseError> {
    let sql = format!(
        "SELECT {} FROM counseling_sessions
         WHERE ($1::uuid IS NULL OR counselor_id = $1 OR patient_id = $1)
           AND ($2::text IS NULL OR status = $2)
         ORDER BY scheduled_for ASC, id
         LIMIT $3 OFFSET $4",
        SESSION_COLUMNS
    );
    let sessions = sqlx::query_as::<_, CounselingSession>(&sql)
        .bind(participant)
        .bind(status.map(|s| s.as_str()))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok(sessions)
}

/// Write back the mutable columns of a session
pub async fn save(conn: &mut PgConnection, session: &CounselingSession) -> Result<CounselingSession, DatabaseError> {
    let sql = format!(
        "UPDATE counseling_sessions
         SET title = $2, status = $3, scheduled_for = $4, duration_minutes = $5, notes = $6,
             updated_at = now()
         WHERE id = $1
         RETURNING {}",
        SESSION_COLUMNS
    );
    sqlx::query_as::<_, CounselingSession>(&sql)
        .bind(session.id)
        .bind(&session.title)
        .bind(session.status.as_str())
        .bind(session.scheduled_for)
        .bind(session.duration_minutes)
        .bind(&session.notes)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("session {}", session.id)))
}

/// Delete a session and its messages. Messages go first; the caller's
/// transaction keeps the pair atomic.
pub async fn delete_with_messages(conn: &mut PgConnection, session_id: Uuid) -> Result<u64, DatabaseError> {
    let messages = sqlx::query("DELETE FROM session_messages WHERE session_id = $1")
        .bind(session_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    let deleted = sqlx::query("DELETE FROM counseling_sessions WHERE id = $1")
        .bind(session_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(DatabaseError::NotFound(format!("session {}", session_id)));
    }
    Ok(messages)
}
