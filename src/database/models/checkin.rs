use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const MIN_MOOD_RATING: i32 = 1;
pub const MAX_MOOD_RATING: i32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MentalHealthCheckin {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood_rating: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Aggregate over a user's recent check-ins
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinSummary {
    pub days: i32,
    pub count: i64,
    pub average_mood: Option<f64>,
    pub latest: Option<MentalHealthCheckin>,
}

pub fn is_valid_mood_rating(rating: i32) -> bool {
    (MIN_MOOD_RATING..=MAX_MOOD_RATING).contains(&rating)
}
