use sqlx::PgPool;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{CheckinSummary, MentalHealthCheckin};

const CHECKIN_COLUMNS: &str = "id, user_id, mood_rating, notes, created_at";

/// Append a check-in; rows are never updated afterwards
pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    mood_rating: i32,
    notes: Option<&str>,
) -> Result<MentalHealthCheckin, DatabaseError> {
    let sql = format!(
        "INSERT INTO mental_health_checkins (id, user_id, mood_rating, notes)
         VALUES ($1, $2, $3, $4)
         RETURNING {}",
        CHECKIN_COLUMNS
    );
    let checkin = sqlx::query_as::<_, MentalHealthCheckin>(&sql)
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(mood_rating)
        .bind(notes)
        .fetch_one(pool)
        .await?;
    Ok(checkin)
}

/// Most recent check-ins first
pub async fn list_for_user(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<MentalHealthCheckin>, DatabaseError> {
    let sql = format!(
        "SELECT {} FROM mental_health_checkins
         WHERE user_id = $1
         ORDER BY created_at DESC, id
         LIMIT $2",
        CHECKIN_COLUMNS
    );
    let checkins = sqlx::query_as::<_, MentalHealthCheckin>(&sql)
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(checkins)
}

/// Count, average mood and latest check-in over the trailing `days` days
pub async fn summary(pool: &PgPool, user_id: Uuid, days: i32) -> Result<CheckinSummary, DatabaseError> {
    let (count, average_mood): (i64, Option<f64>) = sqlx::query_as(
        "SELECT COUNT(*), AVG(mood_rating)::float8
         FROM mental_health_checkins
         WHERE user_id = $1 AND created_at >= now() - make_interval(days => $2)",
    )
    .bind(user_id)
    .bind(days)
    .fetch_one(pool)
    .await?;

    let sql = format!(
        "SELECT {} FROM mental_health_checkins
         WHERE user_id = $1 AND created_at >= now() - make_interval(days => $2)
         ORDER BY created_at DESC, id
         LIMIT 1",
        CHECKIN_COLUMNS
    );
    let latest = sqlx::query_as::<_, MentalHealthCheckin>(&sql)
        .bind(user_id)
        .bind(days)
        .fetch_optional(pool)
        .await?;

    Ok(CheckinSummary {
        days,
        count,
        average_mood,
        latest,
    })
}
