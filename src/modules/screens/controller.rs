use axum::{Json, extract::State};
use toolbox_core::AppError;
use toolbox_models::ScreenDefinition;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/screens",
    responses(
        (status = 200, description = "Screen catalog in menu order", body = Vec<ScreenDefinition>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Screens",
    security(("bearer_auth" = []))
)]
pub async fn get_screens(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<Vec<ScreenDefinition>>, AppError> {
    Ok(Json(state.catalog().screens().to_vec()))
}
