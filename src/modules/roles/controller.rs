use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use toolbox_core::{AppError, screens};
use toolbox_models::{PaginatedRolesResponse, Role, RoleFilterParams, RoleId, RoleSummary, SaveRoleDto};

use crate::middleware::auth::AuthUser;
use crate::middleware::screen::{Access, ensure_screen_access};
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/roles",
    params(RoleFilterParams),
    responses(
        (status = 200, description = "Page of roles", body = PaginatedRolesResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn get_roles(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(filter): Query<RoleFilterParams>,
) -> Result<Json<PaginatedRolesResponse>, AppError> {
    let roles = state.roles.list(filter).await?;
    Ok(Json(roles))
}

#[utoipa::path(
    get,
    path = "/api/roles/all",
    responses(
        (status = 200, description = "Every role, ordered by name", body = Vec<RoleSummary>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn get_all_roles(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<Vec<RoleSummary>>, AppError> {
    let roles = state.roles.get_all_roles().await?;
    Ok(Json(roles))
}

#[utoipa::path(
    get,
    path = "/api/roles/{id}",
    params(
        ("id" = i64, Path, description = "Role ID")
    ),
    responses(
        (status = 200, description = "Role details", body = Role),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Role not found")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn get_role_by_id(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<RoleId>,
) -> Result<Json<Role>, AppError> {
    let role = state.roles.get(id).await?;
    Ok(Json(role))
}

#[utoipa::path(
    get,
    path = "/api/roles/by-name/{name}",
    params(
        ("name" = String, Path, description = "Exact role name")
    ),
    responses(
        (status = 200, description = "Role details", body = Role),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Role not found")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn get_role_by_name(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(name): Path<String>,
) -> Result<Json<Role>, AppError> {
    let role = state.roles.find_by_name(&name).await?;
    Ok(Json(role))
}

#[utoipa::path(
    post,
    path = "/api/roles",
    request_body = SaveRoleDto,
    responses(
        (status = 201, description = "Role created", body = Role),
        (status = 200, description = "Role updated (body carried an id)", body = Role),
        (status = 400, description = "Malformed request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Write access to the Roles screen required"),
        (status = 409, description = "Role name already exists"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn create_role(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<SaveRoleDto>,
) -> Result<(StatusCode, Json<Role>), AppError> {
    ensure_screen_access(&state, &auth_user, screens::ROLES, Access::Write).await?;

    let (role, created) = state.roles.save(dto).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(role)))
}

#[utoipa::path(
    put,
    path = "/api/roles/{id}",
    params(
        ("id" = i64, Path, description = "Role ID")
    ),
    request_body = SaveRoleDto,
    responses(
        (status = 200, description = "Role updated", body = Role),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Write access to the Roles screen required"),
        (status = 404, description = "Role not found"),
        (status = 409, description = "Role name already exists"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn update_role(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<RoleId>,
    ValidatedJson(mut dto): ValidatedJson<SaveRoleDto>,
) -> Result<Json<Role>, AppError> {
    ensure_screen_access(&state, &auth_user, screens::ROLES, Access::Write).await?;

    dto.id = Some(id);
    let (role, _) = state.roles.save(dto).await?;
    Ok(Json(role))
}

#[utoipa::path(
    delete,
    path = "/api/roles/{id}",
    params(
        ("id" = i64, Path, description = "Role ID")
    ),
    responses(
        (status = 204, description = "Role and its permissions deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Write access to the Roles screen required"),
        (status = 404, description = "Role not found")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn delete_role(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<RoleId>,
) -> Result<StatusCode, AppError> {
    ensure_screen_access(&state, &auth_user, screens::ROLES, Access::Write).await?;

    state.roles.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
