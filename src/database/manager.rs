use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    ConnectOptions, PgPool, Postgres, Transaction,
};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

use crate::config;

/// Errors from the database layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Foreign key violated: {0}")]
    ForeignKeyViolation(String),

    #[error("Check constraint violated: {0}")]
    CheckViolation(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            match db_err.code().as_deref() {
                Some("23505") => return DatabaseError::UniqueViolation(constraint),
                Some("23503") => return DatabaseError::ForeignKeyViolation(constraint),
                Some("23514") => return DatabaseError::CheckViolation(constraint),
                _ => {}
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Shared connection pool for the application database
pub struct DatabaseManager;

impl DatabaseManager {
    fn cell() -> &'static OnceCell<PgPool> {
        static POOL: OnceCell<PgPool> = OnceCell::const_new();
        &POOL
    }

    /// Get the application pool, connecting on first use
    pub async fn pool() -> Result<PgPool, DatabaseError> {
        let pool = Self::cell().get_or_try_init(Self::connect).await?;
        Ok(pool.clone())
    }

    /// Begin a transaction on the application pool
    pub async fn begin() -> Result<Transaction<'static, Postgres>, DatabaseError> {
        let pool = Self::pool().await?;
        Ok(pool.begin().await?)
    }

    async fn connect() -> Result<PgPool, DatabaseError> {
        let settings = &config::config().database;
        let url = settings
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        let connection_string = Self::validate_connection_string(url)?;

        let mut options = connection_string.parse::<PgConnectOptions>()?;
        if !settings.enable_query_logging {
            options = options.disable_statement_logging();
        }

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(settings.connection_timeout))
            .connect_with(options)
            .await?;

        info!(
            "Created database pool (max_connections={})",
            settings.max_connections
        );
        Ok(pool)
    }

    /// Parse and normalise a postgres connection string
    fn validate_connection_string(url: &str) -> Result<String, DatabaseError> {
        let parsed = url::Url::parse(url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        match parsed.scheme() {
            "postgres" | "postgresql" => {}
            _ => return Err(DatabaseError::InvalidDatabaseUrl),
        }
        if parsed.path().trim_start_matches('/').is_empty() {
            return Err(DatabaseError::InvalidDatabaseUrl);
        }
        Ok(parsed.into())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check() -> Result<(), DatabaseError> {
        let pool = Self::pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close() {
        if let Some(pool) = Self::cell().get() {
            pool.close().await;
            info!("Closed database pool");
        }
    }
}
