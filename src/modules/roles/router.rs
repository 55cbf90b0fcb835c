use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    create_role, delete_role, get_all_roles, get_role_by_id, get_role_by_name, get_roles,
    update_role,
};

pub fn init_roles_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_roles).post(create_role))
        .route("/all", get(get_all_roles))
        .route("/by-name/{name}", get(get_role_by_name))
        .route(
            "/{id}",
            get(get_role_by_id).put(update_role).delete(delete_role),
        )
}
