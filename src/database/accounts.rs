use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{AuthSession, Role, UserAccount};

/// Find credentials by email (case-insensitive)
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserAccount>, DatabaseError> {
    let account = sqlx::query_as::<_, UserAccount>(
        "SELECT id, email, password_hash, created_at
         FROM users
         WHERE lower(email) = lower($1)",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(account)
}

/// Insert a user and its profile. Runs on the caller's transaction.
pub async fn create_user(
    conn: &mut PgConnection,
    email: &str,
    password_hash: &str,
    display_name: &str,
    role: Role,
) -> Result<UserAccount, DatabaseError> {
    let account = sqlx::query_as::<_, UserAccount>(
        "INSERT INTO users (id, email, password_hash)
         VALUES ($1, lower($2), $3)
         RETURNING id, email, password_hash, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .fetch_one(&mut *conn)
    .await?;

    sqlx::query(
        "INSERT INTO user_profiles (id, role, display_name)
         VALUES ($1, $2, $3)",
    )
    .bind(account.id)
    .bind(role.as_str())
    .bind(display_name)
    .execute(&mut *conn)
    .await?;

    Ok(account)
}

/// Record a new auth session for `user_id`
pub async fn create_session(
    conn: &mut PgConnection,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
) -> Result<AuthSession, DatabaseError> {
    let session = sqlx::query_as::<_, AuthSession>(
        "INSERT INTO auth_sessions (id, user_id, expires_at)
         VALUES ($1, $2, $3)
         RETURNING id, user_id, created_at, expires_at, revoked_at",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(expires_at)
    .fetch_one(&mut *conn)
    .await?;

    Ok(session)
}

/// Active (unrevoked, unexpired) session for a user, joined with the caller's current role
pub async fn find_active_session(
    pool: &PgPool,
    session_id: Uuid,
    user_id: Uuid,
) -> Result<Option<(AuthSession, Role, String)>, DatabaseError> {
    let row: Option<(Uuid, Uuid, DateTime<Utc>, DateTime<Utc>, Option<DateTime<Utc>>, String, String)> =
        sqlx::query_as(
            "SELECT s.id, s.user_id, s.created_at, s.expires_at, s.revoked_at, p.role, p.display_name
             FROM auth_sessions s
             JOIN user_profiles p ON p.id = s.user_id
             WHERE s.id = $1
               AND s.user_id = $2
               AND s.revoked_at IS NULL
               AND s.expires_at > now()",
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    let Some((id, user_id, created_at, expires_at, revoked_at, role, display_name)) = row else {
        return Ok(None);
    };

    let role = role.parse::<Role>().map_err(|e| {
        DatabaseError::Sqlx(sqlx::Error::Decode(Box::new(e)))
    })?;

    let session = AuthSession { id, user_id, created_at, expires_at, revoked_at };
    Ok(Some((session, role, display_name)))
}

/// Revoke a session; returns false when it was already revoked or unknown
pub async fn revoke_session(conn: &mut PgConnection, session_id: Uuid) -> Result<bool, DatabaseError> {
    let result = sqlx::query(
        "UPDATE auth_sessions SET revoked_at = now()
         WHERE id = $1 AND revoked_at IS NULL",
    )
    .bind(session_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Delete sessions that were revoked or expired more than `grace_days` ago
pub async fn prune_sessions(pool: &PgPool, grace_days: i32) -> Result<u64, DatabaseError> {
    let result = sqlx::query(
        "DELETE FROM auth_sessions
         WHERE revoked_at < now() - make_interval(days => $1)
            OR expires_at < now() - make_interval(days => $1)",
    )
    .bind(grace_days)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
