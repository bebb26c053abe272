use axum::{
    Router, middleware,
    routing::{get, post},
};
use fieldnotes_model::api::routes::v1;

use crate::{
    auth::auth_middleware,
    handlers::{auth, health, machines, services, spare_parts, users},
    infra::app_state::AppState,
};

/// Route constants are absolute; the router is nested under
/// [`v1::ROOT`], so register the remainder.
fn nested(path: &'static str) -> &'static str {
    path.strip_prefix(v1::ROOT).unwrap_or(path)
}

/// Create all v1 API routes
pub fn create_v1_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(nested(v1::HEALTH), get(health::health_handler))
        .merge(create_protected_routes(state))
}

/// Create protected routes that require authentication
fn create_protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(nested(v1::auth::LOGOUT), post(auth::logout_handler))
        .route(nested(v1::users::ME), get(users::current_user_handler))
        .route(
            nested(v1::machines::LOOKUP),
            get(machines::lookup_machine_handler),
        )
        .route(
            nested(v1::machines::ITEM),
            get(machines::get_machine_handler),
        )
        .route(
            nested(v1::spare_parts::SEARCH),
            get(spare_parts::search_spare_parts_handler),
        )
        .route(
            nested(v1::spare_parts::LOW_STOCK),
            get(spare_parts::low_stock_handler),
        )
        .route(
            nested(v1::spare_parts::COLLECTION),
            get(spare_parts::list_spare_parts_handler)
                .post(spare_parts::create_spare_part_handler),
        )
        .route(
            nested(v1::spare_parts::ITEM),
            get(spare_parts::get_spare_part_handler)
                .put(spare_parts::update_spare_part_handler)
                .delete(spare_parts::delete_spare_part_handler),
        )
        .route(
            nested(v1::services::COLLECTION),
            get(services::list_services_handler)
                .post(services::create_service_handler),
        )
        .route(
            nested(v1::services::ITEM),
            get(services::get_service_handler)
                .put(services::update_service_handler)
                .delete(services::delete_service_handler),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_paths_drop_the_version_root() {
        assert_eq!(nested(v1::HEALTH), "/health");
        assert_eq!(nested(v1::spare_parts::ITEM), "/spareparts/{id}");
    }
}
