use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::get_screens;

pub fn init_screens_router() -> Router<AppState> {
    Router::new().route("/", get(get_screens))
}
