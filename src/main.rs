use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use mindcare_api::config;
use mindcare_api::database::{schema, DatabaseManager};
use mindcare_api::routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mindcare_api=info,tower_http=info")),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting MindCare API in {:?} mode", config.environment);

    if mindcare_api::is_production!() && config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set in production");
    }

    if config.database.auto_migrate {
        run_migrations().await;
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.api.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("MindCare API listening on http://{}", addr);

    axum::serve(listener, routes::app())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    DatabaseManager::close().await;
    Ok(())
}

/// The server still starts without a database; /health reports 503 until one is reachable
async fn run_migrations() {
    let pool = match DatabaseManager::pool().await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!("Skipping migrations, database unavailable: {}", e);
            return;
        }
    };

    match schema::migrate(&pool).await {
        Ok(()) => tracing::info!("Schema migration complete"),
        Err(e) => tracing::warn!("Schema migration failed: {}", e),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
