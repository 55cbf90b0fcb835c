use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{
    bulk_grant_all, find_by_role_id, get_permission, is_screen_accessible, my_permissions,
    save_permission,
};

pub fn init_permissions_router() -> Router<AppState> {
    Router::new()
        .route("/", put(save_permission))
        .route("/roles/{role_id}", get(find_by_role_id))
        .route("/roles/{role_id}/grant-all", post(bulk_grant_all))
        .route("/roles/{role_id}/screens/{screen}", get(get_permission))
        .route(
            "/roles/{role_id}/screens/{screen}/accessible",
            get(is_screen_accessible),
        )
}

pub fn init_me_router() -> Router<AppState> {
    Router::new().route("/permissions", get(my_permissions))
}
