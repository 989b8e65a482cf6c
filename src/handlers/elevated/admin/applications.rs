use axum::extract::Extension;
use serde::Deserialize;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::api::{validate, ApiJson, ApiPath, ApiQuery, Page};
use crate::database::applications;
use crate::database::models::{ApplicationStatus, CounselorApplication, Role};
use crate::database::profiles;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AppPool, AuthUser};

const MAX_NOTES: usize = 2000;

#[derive(Debug, Deserialize)]
pub struct ApplicationListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewRequest {
    pub notes: Option<String>,
}

/// GET /api/admin/applications?status=
pub async fn applications_get(
    ApiQuery(query): ApiQuery<ApplicationListQuery>,
    Extension(AppPool(pool)): Extension<AppPool>,
) -> ApiResult<Vec<CounselorApplication>> {
    let status = validate::parse_optional_enum::<ApplicationStatus>("status", query.status.as_deref())?;
    let page = Page::from_query(query.limit, query.offset);

    let applications = applications::list(&pool, status, page.limit, page.offset).await?;
    Ok(ApiResponse::success(applications))
}

/// POST /api/admin/applications/:id/approve
///
/// The status change and the applicant's promotion to counselor commit
/// together or not at all.
pub async fn application_approve(
    ApiPath(application_id): ApiPath<Uuid>,
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
    body: Option<ApiJson<ReviewRequest>>,
) -> ApiResult<CounselorApplication> {
    let notes = review_notes(body)?;

    let mut tx = pool.begin().await?;
    let application = lock_pending(&mut *tx, application_id).await?;
    let application = applications::record_review(
        &mut *tx,
        application.id,
        ApplicationStatus::Approved,
        auth_user.user_id,
        notes.as_deref(),
    )
    .await?;
    profiles::set_role(&mut *tx, application.user_id, Role::Counselor).await?;
    tx.commit().await?;

    tracing::info!(
        "Admin {} approved application {}; user {} is now a counselor",
        auth_user.user_id,
        application.id,
        application.user_id
    );
    Ok(ApiResponse::success(application))
}

/// POST /api/admin/applications/:id/reject
pub async fn application_reject(
    ApiPath(application_id): ApiPath<Uuid>,
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
    body: Option<ApiJson<ReviewRequest>>,
) -> ApiResult<CounselorApplication> {
    let notes = review_notes(body)?;

    let mut tx = pool.begin().await?;
    let application = lock_pending(&mut *tx, application_id).await?;
    let application = applications::record_review(
        &mut *tx,
        application.id,
        ApplicationStatus::Rejected,
        auth_user.user_id,
        notes.as_deref(),
    )
    .await?;
    tx.commit().await?;

    tracing::info!("Admin {} rejected application {}", auth_user.user_id, application.id);
    Ok(ApiResponse::success(application))
}

async fn lock_pending(conn: &mut PgConnection, application_id: Uuid) -> Result<CounselorApplication, ApiError> {
    let application = applications::find_for_update(conn, application_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Application {} not found", application_id)))?;

    if !application.is_reviewable() {
        return Err(ApiError::conflict(format!(
            "Application {} has already been {}",
            application.id, application.status
        )));
    }
    Ok(application)
}

fn review_notes(body: Option<ApiJson<ReviewRequest>>) -> Result<Option<String>, ApiError> {
    let ApiJson(review) = body.unwrap_or(ApiJson(ReviewRequest::default()));
    validate::optional_text(review.notes.as_deref(), MAX_NOTES).map_err(|problem| ApiError::invalid_field("notes", problem))
}
