use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use fieldnotes_model::{
    ApiResponse, NewSparePart, Page, SparePart, SparePartId, SparePartPatch,
    SparePartSearch,
};

use crate::infra::{app_state::AppState, errors::AppResult};

type PartResponse = Json<ApiResponse<SparePart>>;
type PartsResponse = Json<ApiResponse<Vec<SparePart>>>;

/// Picker search over part code and model (case-insensitive, at most ten
/// rows). A blank `q` returns the newest parts.
pub async fn search_spare_parts_handler(
    State(state): State<AppState>,
    query: Result<Query<SparePartSearch>, QueryRejection>,
) -> AppResult<PartsResponse> {
    let Query(search) = query?;
    let parts = state.catalog.search(&search).await?;
    Ok(Json(ApiResponse::success(parts)))
}

pub async fn list_spare_parts_handler(
    State(state): State<AppState>,
    query: Result<Query<Page>, QueryRejection>,
) -> AppResult<PartsResponse> {
    let Query(page) = query?;
    let parts = state.catalog.list(page).await?;
    Ok(Json(ApiResponse::success(parts)))
}

pub async fn low_stock_handler(
    State(state): State<AppState>,
) -> AppResult<PartsResponse> {
    let parts = state.catalog.low_stock().await?;
    Ok(Json(ApiResponse::success(parts)))
}

pub async fn create_spare_part_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewSparePart>, JsonRejection>,
) -> AppResult<(StatusCode, PartResponse)> {
    let Json(part) = payload?;
    let created = state.catalog.create(part).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn get_spare_part_handler(
    State(state): State<AppState>,
    id: Result<Path<SparePartId>, PathRejection>,
) -> AppResult<PartResponse> {
    let Path(id) = id?;
    Ok(Json(ApiResponse::success(state.catalog.get(id).await?)))
}

pub async fn update_spare_part_handler(
    State(state): State<AppState>,
    id: Result<Path<SparePartId>, PathRejection>,
    payload: Result<Json<SparePartPatch>, JsonRejection>,
) -> AppResult<PartResponse> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    let updated = state.catalog.update(id, patch).await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn delete_spare_part_handler(
    State(state): State<AppState>,
    id: Result<Path<SparePartId>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id?;
    state.catalog.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
