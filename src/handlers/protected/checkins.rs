use axum::extract::Extension;
use serde::Deserialize;

use crate::api::{validate, ApiJson, ApiQuery, FieldErrors};
use crate::config;
use crate::database::checkins;
use crate::database::models::{checkin, CheckinSummary, MentalHealthCheckin};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AppPool, AuthUser};

const MAX_NOTES: usize = 2000;
const DEFAULT_SUMMARY_DAYS: i32 = 7;
const MAX_SUMMARY_DAYS: i32 = 365;

#[derive(Debug, Deserialize)]
pub struct CheckinRequest {
    #[serde(alias = "moodRating")]
    pub mood: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckinListQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub days: Option<i32>,
}

/// POST /api/checkins - record today's mood (1-5)
pub async fn checkin_post(
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<CheckinRequest>,
) -> ApiResult<MentalHealthCheckin> {
    let mut errors = FieldErrors::new();
    match payload.mood {
        Some(mood) if checkin::is_valid_mood_rating(mood) => {}
        Some(_) => errors.add(
            "mood",
            format!(
                "must be between {} and {}",
                checkin::MIN_MOOD_RATING,
                checkin::MAX_MOOD_RATING
            ),
        ),
        None => errors.add("mood", "is required"),
    }
    let notes = errors
        .check("notes", validate::optional_text(payload.notes.as_deref(), MAX_NOTES))
        .flatten();
    errors.into_result()?;

    let mood = payload.mood.ok_or_else(|| ApiError::invalid_field("mood", "is required"))?;
    let checkin = checkins::create(&pool, auth_user.user_id, mood, notes.as_deref()).await?;
    Ok(ApiResponse::created(checkin))
}

/// GET /api/checkins?limit=
pub async fn checkins_get(
    ApiQuery(query): ApiQuery<CheckinListQuery>,
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Vec<MentalHealthCheckin>> {
    let limit = config::config().page_size(query.limit);
    let checkins = checkins::list_for_user(&pool, auth_user.user_id, limit).await?;
    Ok(ApiResponse::success(checkins))
}

/// GET /api/checkins/summary?days=
pub async fn checkin_summary_get(
    ApiQuery(query): ApiQuery<SummaryQuery>,
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<CheckinSummary> {
    let days = query.days.unwrap_or(DEFAULT_SUMMARY_DAYS).clamp(1, MAX_SUMMARY_DAYS);
    let summary = checkins::summary(&pool, auth_user.user_id, days).await?;
    Ok(ApiResponse::success(summary))
}
