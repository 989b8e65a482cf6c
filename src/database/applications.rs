use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{ApplicationStatus, CounselorApplication};

const APPLICATION_COLUMNS: &str = "id, user_id, credentials, years_experience, specializations, motivation,
    status, reviewed_by, reviewed_at, review_notes, created_at, updated_at";

pub struct NewApplication<'a> {
    pub user_id: Uuid,
    pub credentials: &'a str,
    pub years_experience: i32,
    pub specializations: &'a [String],
    pub motivation: Option<&'a str>,
}

/// Insert a pending application. A second pending application for the same
/// user trips the partial unique index and surfaces as `UniqueViolation`.
pub async fn create(pool: &PgPool, new: NewApplication<'_>) -> Result<CounselorApplication, DatabaseError> {
    let sql = format!(
        "INSERT INTO counselor_applications
            (id, user_id, credentials, years_experience, specializations, motivation, status)
         VALUES ($1, $2, $3, $4, $5, $6, 'pending')
         RETURNING {}",
        APPLICATION_COLUMNS
    );
    let application = sqlx::query_as::<_, CounselorApplication>(&sql)
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(new.credentials)
        .bind(new.years_experience)
        .bind(new.specializations)
        .bind(new.motivation)
        .fetch_one(pool)
        .await?;
    Ok(application)
}

pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<CounselorApplication>, DatabaseError> {
    let sql = format!(
        "SELECT {} FROM counselor_applications WHERE user_id = $1 ORDER BY created_at DESC",
        APPLICATION_COLUMNS
    );
    let applications = sqlx::query_as::<_, CounselorApplication>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(applications)
}

pub async fn list(
    pool: &PgPool,
    status: Option<ApplicationStatus>,
    limit: i64,
    offset: i64,
) -> Result<Vec<CounselorApplication>, DatabaseError> {
    let sql = format!(
        "SELECT {} FROM counselor_applications
         WHERE ($1::text IS NULL OR status = $1)
         ORDER BY created_at ASC
         LIMIT $2 OFFSET $3",
        APPLICATION_COLUMNS
    );
    let applications = sqlx::query_as::<_, CounselorApplication>(&sql)
        .bind(status.map(|s| s.as_str()))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok(applications)
}

/// Load and lock an application for review
pub async fn find_for_update(
    conn: &mut PgConnection,
    application_id: Uuid,
) -> Result<Option<CounselorApplication>, DatabaseError> {
    let sql = format!(
        "SELECT {} FROM counselor_applications WHERE id = $1 FOR UPDATE",
        APPLICATION_COLUMNS
    );
    let application = sqlx::query_as::<_, CounselorApplication>(&sql)
        .bind(application_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(application)
}

/// Record an admin decision on a pending application
pub async fn record_review(
    conn: &mut PgConnection,
    application_id: Uuid,
    status: ApplicationStatus,
    reviewer_id: Uuid,
    notes: Option<&str>,
) -> Result<CounselorApplication, DatabaseError> {
    let sql = format!(
        "UPDATE counselor_applications
         SET status = $2, reviewed_by = $3, reviewed_at = now(), review_notes = $4, updated_at = now()
         WHERE id = $1 AND status = 'pending'
         RETURNING {}",
        APPLICATION_COLUMNS
    );
    sqlx::query_as::<_, CounselorApplication>(&sql)
        .bind(application_id)
        .bind(status.as_str())
        .bind(reviewer_id)
        .bind(notes)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("pending application {}", application_id)))
}
