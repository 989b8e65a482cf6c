use axum::extract::Extension;
use serde::Deserialize;

use crate::api::{validate, ApiJson, FieldErrors};
use crate::database::applications::{self, NewApplication};
use crate::database::models::{CounselorApplication, Role};
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AppPool, AuthUser};

const MAX_CREDENTIALS: usize = 2000;
const MAX_MOTIVATION: usize = 5000;
const MAX_SPECIALIZATION: usize = 100;
const MAX_SPECIALIZATIONS: usize = 20;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRequest {
    pub credentials: Option<String>,
    pub years_experience: Option<i32>,
    #[serde(default)]
    pub specializations: Vec<String>,
    pub motivation: Option<String>,
}

/// POST /api/counselor-applications - patients and nurses apply to become counselors
pub async fn application_post(
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<ApplicationRequest>,
) -> ApiResult<CounselorApplication> {
    auth_user.require_any_role(Role::COUNSELOR_APPLICANTS)?;

    let mut errors = FieldErrors::new();
    let credentials = errors.check(
        "credentials",
        validate::required_text(payload.credentials.as_deref(), MAX_CREDENTIALS),
    );
    let years_experience = match payload.years_experience {
        Some(years) if (0..=80).contains(&years) => years,
        Some(_) => {
            errors.add("yearsExperience", "must be between 0 and 80");
            0
        }
        None => {
            errors.add("yearsExperience", "is required");
            0
        }
    };
    let specializations = errors
        .check("specializations", clean_specializations(payload.specializations))
        .unwrap_or_default();
    let motivation = errors
        .check("motivation", validate::optional_text(payload.motivation.as_deref(), MAX_MOTIVATION))
        .flatten();
    errors.into_result()?;

    let credentials = credentials.unwrap_or_default();
    let application = applications::create(
        &pool,
        NewApplication {
            user_id: auth_user.user_id,
            credentials: &credentials,
            years_experience,
            specializations: &specializations,
            motivation: motivation.as_deref(),
        },
    )
    .await
    .map_err(|e| match e {
        DatabaseError::UniqueViolation(_) => ApiError::conflict("You already have a pending application"),
        other => other.into(),
    })?;

    tracing::info!("User {} submitted counselor application {}", auth_user.user_id, application.id);
    Ok(ApiResponse::created(application))
}

/// GET /api/counselor-applications/mine
pub async fn applications_mine(
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Vec<CounselorApplication>> {
    let applications = applications::list_for_user(&pool, auth_user.user_id).await?;
    Ok(ApiResponse::success(applications))
}

/// Trim, drop blanks and duplicates, enforce bounds
fn clean_specializations(raw: Vec<String>) -> Result<Vec<String>, String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(raw.len());
    for item in raw {
        let item = item.trim();
        if item.is_empty() || cleaned.iter().any(|s| s.eq_ignore_ascii_case(item)) {
            continue;
        }
        if item.chars().count() > MAX_SPECIALIZATION {
            return Err(format!("entries must be at most {} characters", MAX_SPECIALIZATION));
        }
        cleaned.push(item.to_string());
    }
    if cleaned.len() > MAX_SPECIALIZATIONS {
        return Err(format!("at most {} entries allowed", MAX_SPECIALIZATIONS));
    }
    Ok(cleaned)
}
