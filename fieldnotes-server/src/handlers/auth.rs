use axum::{Extension, Json, extract::State};
use fieldnotes_model::{ApiResponse, User};
use serde::Serialize;
use tracing::info;

use crate::auth::SessionToken;
use crate::infra::{app_state::AppState, errors::AppResult};

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub revoked: bool,
}

/// Revoke the session that authenticated this request. The scanner calls
/// this when the technician cancels a scan.
pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> AppResult<Json<ApiResponse<LogoutResponse>>> {
    let revoked = state.sessions.revoke(&token).await?;
    info!(user_id = %user.id, "user logged out");
    Ok(Json(
        ApiResponse::success(LogoutResponse { revoked })
            .with_message("Logged out".to_string()),
    ))
}
