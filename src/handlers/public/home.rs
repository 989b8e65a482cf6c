use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// GET / - service info
pub async fn root() -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "name": "MindCare API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Mental-health support platform backend",
        "endpoints": {
            "health": "/health (public)",
            "auth": "/auth/signup, /auth/signin (public)",
            "api": "/api/* (session required)",
            "admin": "/api/admin/* (admin role required)"
        }
    })))
}

/// GET /health - 200 when the database answers, 503 otherwise
pub async fn health() -> ApiResult<Value> {
    match DatabaseManager::health_check().await {
        Ok(()) => Ok(ApiResponse::success(json!({ "status": "ok", "database": "connected" }))),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            Err(ApiError::service_unavailable("Database unavailable"))
        }
    }
}
