use std::time::Duration;

use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;
use sqlx::PgPool;

use crate::server::app::AppState;

const DB_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    database: DatabaseHealth,
}

#[derive(Serialize)]
pub struct DatabaseHealth {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl DatabaseHealth {
    fn with_status(status: &'static str) -> Self {
        Self {
            status,
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            status: "error",
            error: Some(error),
        }
    }
}

async fn probe_database(pool: &PgPool) -> DatabaseHealth {
    let probe = sqlx::query("SELECT 1").execute(pool);
    match tokio::time::timeout(DB_PROBE_TIMEOUT, probe).await {
        Ok(Ok(_)) => DatabaseHealth::with_status("ok"),
        Ok(Err(e)) => DatabaseHealth::failed(format!("Query failed: {}", e)),
        Err(_) => DatabaseHealth::failed(format!("Query timeout (>{}s)", DB_PROBE_TIMEOUT.as_secs())),
    }
}

/// Health check endpoint
///
/// 503 when the database probe fails. Without a configured database
/// (in-memory dependencies) the service reports healthy.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let database = match &state.db_pool {
        Some(pool) => probe_database(pool).await,
        None => DatabaseHealth::with_status("not_configured"),
    };

    let (code, status) = if database.error.is_none() {
        (StatusCode::OK, "healthy")
    } else {
        tracing::warn!(error = ?database.error, "Health check failed");
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (code, Json(HealthResponse { status, database }))
}
