use axum::extract::Extension;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::{json::double_option, validate, ApiJson, ApiPath, ApiQuery, FieldErrors, Page};
use crate::database::counseling::{self, NewSession};
use crate::database::models::{CounselingSession, Role, SessionStatus, SessionType};
use crate::database::profiles;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AppPool, AuthUser};

const DEFAULT_DURATION_MINUTES: i32 = 60;
const MAX_DURATION_MINUTES: i32 = 480;
const MAX_TITLE: usize = 200;
const MAX_NOTES: usize = 5000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub counselor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    #[serde(alias = "type")]
    pub session_type: Option<String>,
    pub status: Option<String>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub title: Option<String>,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    pub status: Option<String>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct SessionListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/sessions
///
/// The caller's role decides which participant ids come from the body:
/// counselors book with a `patientId`, patients with a `counselorId`, admins
/// supply both. Nurses cannot book sessions. Everything is validated before
/// the insert, so a rejected request writes nothing.
pub async fn session_post(
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<CreateSessionRequest>,
) -> ApiResult<CounselingSession> {
    let (counselor_id, patient_id) = resolve_participants(&auth_user, &payload)?;

    let mut errors = FieldErrors::new();
    let session_type = match payload.session_type.as_deref().map(str::trim) {
        None | Some("") => {
            errors.add("sessionType", "is required");
            None
        }
        Some(text) => errors.check("sessionType", validate::enum_value::<SessionType>(text)),
    };
    let status = match payload.status.as_deref().map(str::trim) {
        None | Some("") => Some(SessionStatus::Scheduled),
        Some(text) => errors.check("status", validate::enum_value::<SessionStatus>(text)),
    };
    if payload.scheduled_for.is_none() {
        errors.add("scheduledFor", "is required");
    }
    let duration = payload.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);
    errors.check("durationMinutes", check_duration(duration));
    let title = errors
        .check("title", validate::optional_text(payload.title.as_deref(), MAX_TITLE))
        .flatten();
    let notes = errors
        .check("notes", validate::optional_text(payload.notes.as_deref(), MAX_NOTES))
        .flatten();
    errors.into_result()?;

    let (Some(session_type), Some(status), Some(scheduled_for)) = (session_type, status, payload.scheduled_for)
    else {
        return Err(ApiError::bad_request("Invalid session request"));
    };

    check_participant_roles(&pool, counselor_id, patient_id).await?;

    let session = counseling::create(
        &pool,
        NewSession {
            counselor_id,
            patient_id,
            title: title.as_deref(),
            session_type,
            status,
            scheduled_for,
            duration_minutes: duration,
            notes: notes.as_deref(),
        },
    )
    .await?;

    tracing::info!(
        "Session {} booked by {} for counselor {} and patient {}",
        session.id,
        auth_user.user_id,
        counselor_id,
        patient_id
    );
    Ok(ApiResponse::created(session))
}

/// GET /api/sessions?status= - the caller's sessions; admins see all
pub async fn sessions_get(
    ApiQuery(query): ApiQuery<SessionListQuery>,
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Vec<CounselingSession>> {
    let status = validate::parse_optional_enum::<SessionStatus>("status", query.status.as_deref())?;
    let page = Page::from_query(query.limit, query.offset);
    let participant = (!auth_user.is_admin()).then_some(auth_user.user_id);

    let sessions = counseling::list(&pool, participant, status, page.limit, page.offset).await?;
    Ok(ApiResponse::success(sessions))
}

/// GET /api/sessions/:id - participants and admins
pub async fn session_show(
    ApiPath(session_id): ApiPath<Uuid>,
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<CounselingSession> {
    let session = load_session(&pool, session_id).await?;
    if !session.is_participant(auth_user.user_id) && !auth_user.is_admin() {
        return Err(ApiError::forbidden("You are not a participant in this session"));
    }
    Ok(ApiResponse::success(session))
}

/// PATCH /api/sessions/:id - owning counselor or admin. The row stays locked
/// from the transition check to the write, so concurrent status changes
/// are serialized.
pub async fn session_patch(
    ApiPath(session_id): ApiPath<Uuid>,
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<UpdateSessionRequest>,
) -> ApiResult<CounselingSession> {
    let mut tx = pool.begin().await?;
    let mut session = counseling::find_for_update(&mut *tx, session_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Session {} not found", session_id)))?;
    ensure_owner(&session, &auth_user)?;

    apply_update(&mut session, payload)?;
    let session = counseling::save(&mut *tx, &session).await?;
    tx.commit().await?;

    tracing::info!("Session {} updated by {} (status {})", session.id, auth_user.user_id, session.status);
    Ok(ApiResponse::success(session))
}

/// DELETE /api/sessions/:id - removes the session's messages first
pub async fn session_delete(
    ApiPath(session_id): ApiPath<Uuid>,
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let session = load_session(&pool, session_id).await?;
    ensure_owner(&session, &auth_user)?;

    let mut tx = pool.begin().await?;
    let messages_deleted = counseling::delete_with_messages(&mut *tx, session_id).await?;
    tx.commit().await?;

    tracing::info!(
        "Session {} deleted by {} along with {} messages",
        session_id,
        auth_user.user_id,
        messages_deleted
    );
    Ok(ApiResponse::success(json!({
        "id": session_id,
        "deleted": true,
        "messagesDeleted": messages_deleted
    })))
}

pub(crate) async fn load_session(pool: &PgPool, session_id: Uuid) -> Result<CounselingSession, ApiError> {
    counseling::find(pool, session_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Session {} not found", session_id)))
}

fn ensure_owner(session: &CounselingSession, auth_user: &AuthUser) -> Result<(), ApiError> {
    if session.counselor_id == auth_user.user_id || auth_user.is_admin() {
        Ok(())
    } else {
        Err(ApiError::forbidden("Only the session's counselor or an admin can change it"))
    }
}

fn resolve_participants(auth_user: &AuthUser, payload: &CreateSessionRequest) -> Result<(Uuid, Uuid), ApiError> {
    let require = |id: Option<Uuid>, field: &str| id.ok_or_else(|| ApiError::invalid_field(field, "is required"));

    match auth_user.role {
        Role::Counselor => {
            if payload.counselor_id.is_some_and(|id| id != auth_user.user_id) {
                return Err(ApiError::forbidden("Counselors can only book their own sessions"));
            }
            Ok((auth_user.user_id, require(payload.patient_id, "patientId")?))
        }
        Role::Patient => {
            if payload.patient_id.is_some_and(|id| id != auth_user.user_id) {
                return Err(ApiError::forbidden("Patients can only book sessions for themselves"));
            }
            Ok((require(payload.counselor_id, "counselorId")?, auth_user.user_id))
        }
        Role::Admin => Ok((
            require(payload.counselor_id, "counselorId")?,
            require(payload.patient_id, "patientId")?,
        )),
        Role::Nurse => Err(ApiError::forbidden("Nurses cannot book counseling sessions")),
    }
}

async fn check_participant_roles(pool: &PgPool, counselor_id: Uuid, patient_id: Uuid) -> Result<(), ApiError> {
    if counselor_id == patient_id {
        return Err(ApiError::invalid_field("patientId", "must differ from the counselor"));
    }
    match profiles::role_of(pool, counselor_id).await? {
        Some(Role::Counselor) => {}
        _ => return Err(ApiError::invalid_field("counselorId", "does not reference a counselor")),
    }
    if profiles::role_of(pool, patient_id).await?.is_none() {
        return Err(ApiError::invalid_field("patientId", "does not reference a user"));
    }
    Ok(())
}

fn apply_update(session: &mut CounselingSession, update: UpdateSessionRequest) -> Result<(), ApiError> {
    let mut errors = FieldErrors::new();

    if let Some(status) = update.status.as_deref() {
        if let Some(next) = errors.check("status", validate::enum_value::<SessionStatus>(status.trim())) {
            if !session.status.can_transition_to(next) {
                return Err(ApiError::conflict(format!(
                    "Cannot move a session from {} to {}",
                    session.status, next
                )));
            }
            session.status = next;
        }
    }
    if let Some(title) = update.title {
        let title = title.unwrap_or_default();
        if let Some(title) = errors.check("title", validate::optional_text(Some(&title), MAX_TITLE)) {
            session.title = title;
        }
    }
    if let Some(notes) = update.notes {
        let notes = notes.unwrap_or_default();
        if let Some(notes) = errors.check("notes", validate::optional_text(Some(&notes), MAX_NOTES)) {
            session.notes = notes;
        }
    }
    if let Some(scheduled_for) = update.scheduled_for {
        session.scheduled_for = scheduled_for;
    }
    if let Some(duration) = update.duration_minutes {
        if errors.check("durationMinutes", check_duration(duration)).is_some() {
            session.duration_minutes = duration;
        }
    }

    errors.into_result()
}

fn check_duration(minutes: i32) -> Result<(), String> {
    if (1..=MAX_DURATION_MINUTES).contains(&minutes) {
        Ok(())
    } else {
        Err(format!("must be between 1 and {}", MAX_DURATION_MINUTES))
    }
}
