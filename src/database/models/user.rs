use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

text_enum! {
    /// Role stored on `user_profiles.role`; governs endpoint authorization
    pub enum Role ("role") {
        Patient => "patient",
        Counselor => "counselor",
        Nurse => "nurse",
        Admin => "admin",
    }
}

/// Bounds shared with the `user_profiles.age` CHECK constraint
pub const MIN_AGE: i32 = 13;
pub const MAX_AGE: i32 = 120;

impl Role {
    /// Roles that may apply to become a counselor
    pub const COUNSELOR_APPLICANTS: &'static [Role] = &[Role::Patient, Role::Nurse];
}

/// Credentials row in `users`
#[derive(Debug, Clone, FromRow)]
pub struct UserAccount {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Profile row in `user_profiles`, joined with the account email
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub display_name: String,
    pub bio: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub emergency_contact: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile fields visible to other users
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: Uuid,
    pub role: Role,
    pub display_name: String,
    pub bio: Option<String>,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<UserProfile> for PublicProfile {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            role: profile.role,
            display_name: profile.display_name,
            bio: profile.bio,
            gender: profile.gender,
            location: profile.location,
            avatar_url: profile.avatar_url,
        }
    }
}

/// Server-tracked sign-in, referenced by the `sid` claim of an access token
#[derive(Debug, Clone, FromRow)]
pub struct AuthSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl AuthSession {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}
