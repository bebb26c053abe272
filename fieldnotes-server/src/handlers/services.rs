use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use fieldnotes_model::{
    ApiResponse, NewServiceRequest, ServiceId, ServicePatch, ServiceRecord,
    User,
};

use crate::infra::{app_state::AppState, errors::AppResult};

/// Log a service event. The performer is the authenticated user; the body
/// carries `machine_id`, optional `spare_part_id` and non-empty `notes`.
///
/// # Response
///
/// - `201 Created` with the stored record
/// - `400 Bad Request` for blank notes or an unknown machine/spare part
/// - `401 Unauthorized` without a live session (rejected by the auth layer)
pub async fn create_service_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    payload: Result<Json<NewServiceRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<ServiceRecord>>)> {
    let Json(request) = payload?;
    let record = state.service_log.create(Some(user.id), request).await?;
    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::success(record)
                .with_message("Service logged".to_string()),
        ),
    ))
}

pub async fn list_services_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<ServiceRecord>>>> {
    Ok(Json(ApiResponse::success(state.service_log.list().await?)))
}

pub async fn get_service_handler(
    State(state): State<AppState>,
    id: Result<Path<ServiceId>, PathRejection>,
) -> AppResult<Json<ApiResponse<ServiceRecord>>> {
    let Path(id) = id?;
    Ok(Json(ApiResponse::success(state.service_log.get(id).await?)))
}

pub async fn update_service_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    id: Result<Path<ServiceId>, PathRejection>,
    payload: Result<Json<ServicePatch>, JsonRejection>,
) -> AppResult<Json<ApiResponse<ServiceRecord>>> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    let record = state.service_log.update(Some(user.id), id, patch).await?;
    Ok(Json(ApiResponse::success(record)))
}

pub async fn delete_service_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    id: Result<Path<ServiceId>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id?;
    state.service_log.delete(Some(user.id), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
