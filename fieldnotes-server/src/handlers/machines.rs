use axum::{
    Json,
    extract::{Path, Query, State, rejection::PathRejection},
};
use fieldnotes_model::{ApiResponse, MachineId, MachineRecord};
use serde::Deserialize;

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    /// Decoded QR payload, forwarded verbatim by the scanner.
    #[serde(default)]
    pub id: Option<String>,
}

/// Resolve a machine by the code printed on its QR label.
///
/// - `200` with the machine record
/// - `400` when `id` is missing
/// - `404` when no machine carries that code, including payloads that
///   cannot be a machine code at all
pub async fn lookup_machine_handler(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> AppResult<Json<ApiResponse<MachineRecord>>> {
    let identifier = query
        .id
        .ok_or_else(|| AppError::bad_request("Missing machine identifier"))?;

    let machine = state.lookup.resolve(&identifier).await?;
    Ok(Json(ApiResponse::success(machine)))
}

pub async fn get_machine_handler(
    State(state): State<AppState>,
    id: Result<Path<MachineId>, PathRejection>,
) -> AppResult<Json<ApiResponse<MachineRecord>>> {
    let Path(id) = id?;
    let machine = state.lookup.get(id).await?;
    Ok(Json(ApiResponse::success(machine)))
}
