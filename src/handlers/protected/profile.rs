use axum::extract::Extension;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{json::double_option, validate, ApiJson, ApiPath, ApiQuery, FieldErrors, Page};
use crate::database::models::user::{MAX_AGE, MIN_AGE};
use crate::database::models::{PublicProfile, Role, UserProfile};
use crate::database::profiles;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AppPool, AuthUser};

const MAX_NAME: usize = 100;
const MAX_BIO: usize = 2000;
const MAX_SHORT: usize = 100;
const MAX_URL: usize = 2048;

/// Fields a user may change on their own profile. For the optional ones, an
/// explicit `null` clears the value and an absent key leaves it untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub age: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub gender: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub emergency_contact: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub avatar_url: Option<Option<String>>,
    /// Present only so it can be refused
    pub role: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ProfileView {
    Full(UserProfile),
    Public(PublicProfile),
}

#[derive(Debug, Deserialize)]
pub struct CounselorQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/profile
pub async fn profile_get(
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<UserProfile> {
    let profile = profiles::find(&pool, auth_user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;
    Ok(ApiResponse::success(profile))
}

/// PUT /api/profile - read, merge and save inside one transaction
pub async fn profile_put(
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> ApiResult<UserProfile> {
    if payload.role.is_some() {
        return Err(ApiError::forbidden("Role changes require an admin"));
    }

    let mut tx = pool.begin().await?;
    let mut profile = profiles::find_for_update(&mut *tx, auth_user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    apply_update(&mut profile, payload)?;
    profiles::save(&mut *tx, &profile).await?;
    tx.commit().await?;

    let profile = profiles::find(&pool, auth_user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;
    Ok(ApiResponse::success(profile))
}

/// GET /api/profiles/:user_id - full profile for the owner and admins, public view otherwise
pub async fn profile_show(
    ApiPath(user_id): ApiPath<Uuid>,
    Extension(AppPool(pool)): Extension<AppPool>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<ProfileView> {
    let profile = profiles::find(&pool, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Profile {} not found", user_id)))?;

    let view = if auth_user.user_id == user_id || auth_user.is_admin() {
        ProfileView::Full(profile)
    } else {
        ProfileView::Public(profile.into())
    };
    Ok(ApiResponse::success(view))
}

/// GET /api/counselors
pub async fn counselors_get(
    ApiQuery(query): ApiQuery<CounselorQuery>,
    Extension(AppPool(pool)): Extension<AppPool>,
) -> ApiResult<Vec<PublicProfile>> {
    let page = Page::from_query(query.limit, query.offset);
    let counselors = profiles::list(&pool, Some(Role::Counselor), page.limit, page.offset).await?;
    Ok(ApiResponse::success(counselors.into_iter().map(PublicProfile::from).collect()))
}

fn apply_update(profile: &mut UserProfile, update: UpdateProfileRequest) -> Result<(), ApiError> {
    let mut errors = FieldErrors::new();

    if let Some(name) = update.display_name {
        if let Some(name) = errors.check("displayName", validate::required_text(Some(&name), MAX_NAME)) {
            profile.display_name = name;
        }
    }

    merge_text(&mut errors, "bio", update.bio, MAX_BIO, &mut profile.bio);
    merge_text(&mut errors, "gender", update.gender, MAX_SHORT, &mut profile.gender);
    merge_text(&mut errors, "location", update.location, MAX_SHORT, &mut profile.location);
    merge_text(&mut errors, "phone", update.phone, MAX_SHORT, &mut profile.phone);
    merge_text(&mut errors, "emergencyContact", update.emergency_contact, MAX_SHORT, &mut profile.emergency_contact);
    merge_text(&mut errors, "avatarUrl", update.avatar_url, MAX_URL, &mut profile.avatar_url);

    match update.age {
        Some(Some(age)) if !(MIN_AGE..=MAX_AGE).contains(&age) => {
            errors.add("age", format!("must be between {} and {}", MIN_AGE, MAX_AGE))
        }
        Some(age) => profile.age = age,
        None => {}
    }

    errors.into_result()
}

fn merge_text(
    errors: &mut FieldErrors,
    field: &str,
    update: Option<Option<String>>,
    max_chars: usize,
    target: &mut Option<String>,
) {
    match update {
        None => {}
        Some(None) => *target = None,
        Some(Some(text)) => {
            if let Some(value) = errors.check(field, validate::optional_text(Some(&text), max_chars)) {
                *target = value;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn profile() -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            email: "pat@example.com".into(),
            role: Role::Patient,
            display_name: "Pat".into(),
            bio: Some("hello".into()),
            age: Some(30),
            gender: None,
            location: Some("Lagos".into()),
            phone: None,
            emergency_contact: None,
            avatar_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn merge_keeps_absent_and_clears_null() {
        let mut p = profile();
        let update: UpdateProfileRequest =
            serde_json::from_str(r#"{"bio": null, "phone": "555-0100", "displayName": " Patricia "}"#).unwrap();
        apply_update(&mut p, update).unwrap();

        assert_eq!(p.display_name, "Patricia");
        assert_eq!(p.bio, None);
        assert_eq!(p.phone.as_deref(), Some("555-0100"));
        assert_eq!(p.location.as_deref(), Some("Lagos"));
        assert_eq!(p.age, Some(30));
    }

    #[test]
    fn merge_rejects_bad_values() {
        let mut p = profile();
        let update: UpdateProfileRequest = serde_json::from_str(r#"{"displayName": "  ", "age": 400}"#).unwrap();
        let body = apply_update(&mut p, update).unwrap_err().to_json();
        assert_eq!(body["field_errors"]["displayName"], "is required");
        assert_eq!(body["field_errors"]["age"], "must be between 13 and 120");
    }

    #[test]
    fn age_bounds_match_the_table_constraint() {
        for (age, ok) in [(5, false), (12, false), (13, true), (120, true), (140, false)] {
            let mut p = profile();
            let update: UpdateProfileRequest = serde_json::from_value(serde_json::json!({ "age": age })).unwrap();
            assert_eq!(apply_update(&mut p, update).is_ok(), ok, "age {age}");
        }
    }
}
