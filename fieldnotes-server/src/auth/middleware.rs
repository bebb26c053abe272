use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::infra::{app_state::AppState, errors::AppError};

/// The raw bearer token that authenticated the current request, stashed
/// for handlers that act on the session itself (logout).
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

/// Resolve the bearer token to a live session and attach the acting
/// [`fieldnotes_model::User`] plus the [`SessionToken`] to the request.
///
/// Runs as a `route_layer`, so unauthenticated requests are rejected with
/// 401 before any handler (and therefore any write) executes.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(request.headers())
        .ok_or_else(|| AppError::unauthorized("Authentication required"))?;

    let authenticated = state.sessions.authenticate(&token).await.map_err(|err| {
        debug!(error = %err, path = %request.uri().path(), "rejected bearer token");
        AppError::from(err)
    })?;

    request.extensions_mut().insert(authenticated.user);
    request.extensions_mut().insert(SessionToken(token));

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}
