use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{Role, UserProfile};

const PROFILE_SELECT: &str = "
    SELECT p.id, u.email, p.role, p.display_name, p.bio, p.age, p.gender, p.location,
           p.phone, p.emergency_contact, p.avatar_url, p.created_at, p.updated_at
    FROM user_profiles p
    JOIN users u ON u.id = p.id";

pub async fn find(pool: &PgPool, user_id: Uuid) -> Result<Option<UserProfile>, DatabaseError> {
    let sql = format!("{} WHERE p.id = $1", PROFILE_SELECT);
    let profile = sqlx::query_as::<_, UserProfile>(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(profile)
}

/// Same as [`find`] but locks the row for the rest of the transaction
pub async fn find_for_update(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Option<UserProfile>, DatabaseError> {
    let sql = format!("{} WHERE p.id = $1 FOR UPDATE OF p", PROFILE_SELECT);
    let profile = sqlx::query_as::<_, UserProfile>(&sql)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(profile)
}

pub async fn list(
    pool: &PgPool,
    role: Option<Role>,
    limit: i64,
    offset: i64,
) -> Result<Vec<UserProfile>, DatabaseError> {
    let sql = format!(
        "{} WHERE ($1::text IS NULL OR p.role = $1)
         ORDER BY p.display_name, p.id
         LIMIT $2 OFFSET $3",
        PROFILE_SELECT
    );
    let profiles = sqlx::query_as::<_, UserProfile>(&sql)
        .bind(role.map(|r| r.as_str()))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok(profiles)
}

/// Persist the user-editable profile fields (never the role)
pub async fn save(conn: &mut PgConnection, profile: &UserProfile) -> Result<(), DatabaseError> {
    let result = sqlx::query(
        "UPDATE user_profiles
         SET display_name = $2, bio = $3, age = $4, gender = $5, location = $6,
             phone = $7, emergency_contact = $8, avatar_url = $9, updated_at = now()
         WHERE id = $1",
    )
    .bind(profile.id)
    .bind(&profile.display_name)
    .bind(&profile.bio)
    .bind(profile.age)
    .bind(&profile.gender)
    .bind(&profile.location)
    .bind(&profile.phone)
    .bind(&profile.emergency_contact)
    .bind(&profile.avatar_url)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("profile {}", profile.id)));
    }
    Ok(())
}

/// Set a user's role; errors with NotFound when the profile does not exist
pub async fn set_role(conn: &mut PgConnection, user_id: Uuid, role: Role) -> Result<(), DatabaseError> {
    let result = sqlx::query(
        "UPDATE user_profiles SET role = $2, updated_at = now() WHERE id = $1",
    )
    .bind(user_id)
    .bind(role.as_str())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("profile {}", user_id)));
    }
    Ok(())
}

pub async fn role_of(pool: &PgPool, user_id: Uuid) -> Result<Option<Role>, DatabaseError> {
    let row: Option<(String,)> = sqlx::query_as("SELECT role FROM user_profiles WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    row.map(|(role,)| role.parse::<Role>())
        .transpose()
        .map_err(|e| DatabaseError::Sqlx(sqlx::Error::Decode(Box::new(e))))
}
