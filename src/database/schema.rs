// Embedded schema, row-level security switches and consistency checks.
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};

use super::manager::DatabaseError;

/// Tables owned by the application, in dependency order
pub const TABLES: &[&str] = &[
    "users",
    "user_profiles",
    "auth_sessions",
    "counselor_applications",
    "counseling_sessions",
    "session_messages",
    "discussion_posts",
    "discussion_comments",
    "mental_health_checkins",
];

/// Arbitrary key for the migration advisory lock
const MIGRATION_LOCK_KEY: i64 = 0x6d69_6e64_6361_7265;

const DDL: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS user_profiles (
        id UUID PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
        role TEXT NOT NULL DEFAULT 'patient'
            CHECK (role IN ('patient', 'counselor', 'nurse', 'admin')),
        display_name TEXT NOT NULL,
        bio TEXT,
        age INTEGER CHECK (age IS NULL OR age BETWEEN 13 AND 120),
        gender TEXT,
        location TEXT,
        phone TEXT,
        emergency_contact TEXT,
        avatar_url TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS auth_sessions (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        expires_at TIMESTAMPTZ NOT NULL,
        revoked_at TIMESTAMPTZ
    )"#,
    r#"CREATE TABLE IF NOT EXISTS counselor_applications (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        credentials TEXT NOT NULL,
        years_experience INTEGER NOT NULL CHECK (years_experience >= 0),
        specializations TEXT[] NOT NULL DEFAULT '{}',
        motivation TEXT,
        status TEXT NOT NULL DEFAULT 'pending'
            CHECK (status IN ('pending', 'approved', 'rejected')),
        reviewed_by UUID REFERENCES users(id),
        reviewed_at TIMESTAMPTZ,
        review_notes TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE UNIQUE INDEX IF NOT EXISTS counselor_applications_one_pending
        ON counselor_applications (user_id) WHERE status = 'pending'"#,
    r#"CREATE TABLE IF NOT EXISTS counseling_sessions (
        id UUID PRIMARY KEY,
        counselor_id UUID NOT NULL REFERENCES users(id),
        patient_id UUID NOT NULL REFERENCES users(id),
        title TEXT,
        session_type TEXT NOT NULL CHECK (session_type IN ('one_on_one', 'group')),
        status TEXT NOT NULL DEFAULT 'scheduled'
            CHECK (status IN ('scheduled', 'ongoing', 'completed', 'cancelled')),
        scheduled_for TIMESTAMPTZ NOT NULL,
        duration_minutes INTEGER NOT NULL DEFAULT 50,
        notes TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE INDEX IF NOT EXISTS counseling_sessions_counselor ON counseling_sessions (counselor_id)"#,
    r#"CREATE INDEX IF NOT EXISTS counseling_sessions_patient ON counseling_sessions (patient_id)"#,
    r#"CREATE TABLE IF NOT EXISTS session_messages (
        id UUID PRIMARY KEY,
        session_id UUID NOT NULL REFERENCES counseling_sessions(id),
        sender_id UUID NOT NULL REFERENCES users(id),
        recipient_id UUID NOT NULL REFERENCES users(id),
        content TEXT NOT NULL,
        is_read BOOLEAN NOT NULL DEFAULT false,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE INDEX IF NOT EXISTS session_messages_session ON session_messages (session_id, created_at)"#,
    r#"CREATE TABLE IF NOT EXISTS discussion_posts (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES users(id),
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        category TEXT,
        is_approved BOOLEAN NOT NULL DEFAULT true,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS discussion_comments (
        id UUID PRIMARY KEY,
        post_id UUID NOT NULL REFERENCES discussion_posts(id),
        user_id UUID NOT NULL REFERENCES users(id),
        content TEXT NOT NULL,
        is_approved BOOLEAN NOT NULL DEFAULT true,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE INDEX IF NOT EXISTS discussion_comments_post ON discussion_comments (post_id, created_at)"#,
    r#"CREATE TABLE IF NOT EXISTS mental_health_checkins (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        mood_rating INTEGER NOT NULL CHECK (mood_rating BETWEEN 1 AND 5),
        notes TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE INDEX IF NOT EXISTS mental_health_checkins_user ON mental_health_checkins (user_id, created_at DESC)"#,
];

/// Apply the embedded schema. Idempotent; concurrent callers serialize on an advisory lock.
pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(MIGRATION_LOCK_KEY)
        .execute(&mut *tx)
        .await?;

    for statement in DDL {
        sqlx::query(statement).execute(&mut *tx).await?;
    }

    tx.commit().await?;
    info!("Schema migration applied ({} statements)", DDL.len());
    Ok(())
}

fn is_known_table(table: &str) -> bool {
    TABLES.contains(&table)
}

/// Enable or disable row-level security on the given tables (all tables when empty)
pub async fn set_row_level_security(
    pool: &PgPool,
    enabled: bool,
    tables: &[String],
) -> Result<Vec<String>, DatabaseError> {
    let targets: Vec<String> = if tables.is_empty() {
        TABLES.iter().map(|t| t.to_string()).collect()
    } else {
        tables.to_vec()
    };

    if let Some(unknown) = targets.iter().find(|t| !is_known_table(t)) {
        return Err(DatabaseError::NotFound(format!("table '{}'", unknown)));
    }

    let action = if enabled { "ENABLE" } else { "DISABLE" };
    let mut tx = pool.begin().await?;
    for table in &targets {
        // Identifiers cannot be bound; only names from TABLES reach this point
        let statement = format!("ALTER TABLE {} {} ROW LEVEL SECURITY", table, action);
        sqlx::query(&statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    info!("Row level security {}d on {} table(s)", action.to_lowercase(), targets.len());
    Ok(targets)
}

/// Row-level security state per table
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RlsStatus {
    pub table_name: String,
    pub rls_enabled: bool,
}

pub async fn row_level_security_status(pool: &PgPool) -> Result<Vec<RlsStatus>, DatabaseError> {
    let tables: Vec<String> = TABLES.iter().map(|t| t.to_string()).collect();
    let rows = sqlx::query_as::<_, RlsStatus>(
        "SELECT c.relname::text AS table_name, c.relrowsecurity AS rls_enabled
         FROM pg_class c
         JOIN pg_namespace n ON n.oid = c.relnamespace
         WHERE n.nspname = 'public' AND c.relname::text = ANY($1)
         ORDER BY c.relname",
    )
    .bind(&tables)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Orphaned or inconsistent rows found by [`check_consistency`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConsistencyReport {
    pub missing_tables: Vec<String>,
    pub users_without_profile: i64,
    pub messages_without_session: i64,
    pub messages_from_non_participants: i64,
    pub comments_without_post: i64,
    pub approved_applicants_not_counselors: i64,
}

impl ConsistencyReport {
    pub fn is_clean(&self) -> bool {
        self.missing_tables.is_empty()
            && self.users_without_profile == 0
            && self.messages_without_session == 0
            && self.messages_from_non_participants == 0
            && self.comments_without_post == 0
            && self.approved_applicants_not_counselors == 0
    }
}

async fn count(pool: &PgPool, sql: &str) -> Result<i64, DatabaseError> {
    let (n,): (i64,) = sqlx::query_as(sql).fetch_one(pool).await?;
    Ok(n)
}

/// Look for the partial-failure leftovers that multi-step writes could leave behind
pub async fn check_consistency(pool: &PgPool) -> Result<ConsistencyReport, DatabaseError> {
    let present: Vec<(String,)> = sqlx::query_as(
        "SELECT table_name::text FROM information_schema.tables WHERE table_schema = 'public'",
    )
    .fetch_all(pool)
    .await?;
    let present: Vec<String> = present.into_iter().map(|(t,)| t).collect();

    let mut report = ConsistencyReport {
        missing_tables: TABLES
            .iter()
            .filter(|t| !present.iter().any(|p| p == *t))
            .map(|t| t.to_string())
            .collect(),
        ..Default::default()
    };

    if !report.missing_tables.is_empty() {
        warn!("Consistency check skipped; missing tables: {:?}", report.missing_tables);
        return Ok(report);
    }

    report.users_without_profile = count(
        pool,
        "SELECT COUNT(*) FROM users u LEFT JOIN user_profiles p ON p.id = u.id WHERE p.id IS NULL",
    )
    .await?;
    report.messages_without_session = count(
        pool,
        "SELECT COUNT(*) FROM session_messages m
         LEFT JOIN counseling_sessions s ON s.id = m.session_id WHERE s.id IS NULL",
    )
    .await?;
    report.messages_from_non_participants = count(
        pool,
        "SELECT COUNT(*) FROM session_messages m
         JOIN counseling_sessions s ON s.id = m.session_id
         WHERE m.sender_id NOT IN (s.counselor_id, s.patient_id)",
    )
    .await?;
    report.comments_without_post = count(
        pool,
        "SELECT COUNT(*) FROM discussion_comments c
         LEFT JOIN discussion_posts p ON p.id = c.post_id WHERE p.id IS NULL",
    )
    .await?;
    report.approved_applicants_not_counselors = count(
        pool,
        "SELECT COUNT(DISTINCT a.user_id) FROM counselor_applications a
         JOIN user_profiles p ON p.id = a.user_id
         WHERE a.status = 'approved' AND p.role NOT IN ('counselor', 'admin')",
    )
    .await?;

    Ok(report)
}
