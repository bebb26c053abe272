use axum::{Extension, Json};
use fieldnotes_model::{ApiResponse, User};

pub async fn current_user_handler(
    Extension(user): Extension<User>,
) -> Json<ApiResponse<User>> {
    Json(ApiResponse::success(user))
}
