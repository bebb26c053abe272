use axum::{Json, extract::State};
use fieldnotes_model::ApiResponse;
use serde::Serialize;
use tracing::warn;

use crate::infra::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    /// `"ok"`, `"unreachable"`, or `"in-memory"` when no pool is attached.
    pub database: &'static str,
}

/// Liveness probe. Always answers 200; a failing database ping downgrades
/// `status` to `"degraded"`.
pub async fn health_handler(
    State(state): State<AppState>,
) -> Json<ApiResponse<HealthReport>> {
    let database = match &state.postgres {
        Some(pg) => match pg.ping().await {
            Ok(()) => "ok",
            Err(err) => {
                warn!(error = %err, "database health check failed");
                "unreachable"
            }
        },
        None => "in-memory",
    };

    Json(ApiResponse::success(HealthReport {
        status: if database == "unreachable" {
            "degraded"
        } else {
            "healthy"
        },
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        database,
    }))
}
