use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use toolbox_core::AppError;
use toolbox_models::{
    BulkGrantDto, BulkGrantReport, EffectivePermissionsResponse, PermissionDto, PermissionFlags,
    PermissionRecord, PermissionStateResponse, RoleId, SavePermissionDto, ScreenAccessResponse,
};

use crate::middleware::auth::{AuthUser, RequireAdmin};
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/permissions/roles/{role_id}",
    params(
        ("role_id" = i64, Path, description = "Role ID")
    ),
    responses(
        (status = 200, description = "Permission records of the role (empty for an unknown role)", body = Vec<PermissionDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn find_by_role_id(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(role_id): Path<RoleId>,
) -> Result<Json<Vec<PermissionDto>>, AppError> {
    let permissions = state.permissions.find_by_role_id(role_id).await?;
    Ok(Json(permissions))
}

#[utoipa::path(
    put,
    path = "/api/permissions",
    request_body = SavePermissionDto,
    responses(
        (status = 200, description = "Permission saved", body = PermissionRecord),
        (status = 400, description = "Malformed request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "ADMIN authority required"),
        (status = 404, description = "Role or screen not found"),
        (status = 422, description = "Write permission requires read permission")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn save_permission(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    ValidatedJson(dto): ValidatedJson<SavePermissionDto>,
) -> Result<Json<PermissionRecord>, AppError> {
    let record = state
        .permissions
        .set_permission(dto.role_id, &dto.screen_name, dto.can_read, dto.can_write)
        .await?;
    Ok(Json(record))
}

#[utoipa::path(
    get,
    path = "/api/permissions/roles/{role_id}/screens/{screen}",
    params(
        ("role_id" = i64, Path, description = "Role ID"),
        ("screen" = String, Path, description = "Screen name")
    ),
    responses(
        (status = 200, description = "Effective flags; denied when no record exists", body = PermissionStateResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn get_permission(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path((role_id, screen)): Path<(RoleId, String)>,
) -> Result<Json<PermissionStateResponse>, AppError> {
    let flags = state.permissions.get_permission(role_id, &screen).await?;
    Ok(Json(PermissionStateResponse::new(role_id, screen, flags)))
}

#[utoipa::path(
    get,
    path = "/api/permissions/roles/{role_id}/screens/{screen}/accessible",
    params(
        ("role_id" = i64, Path, description = "Role ID"),
        ("screen" = String, Path, description = "Screen name")
    ),
    responses(
        (status = 200, description = "Whether the role may view the screen", body = ScreenAccessResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn is_screen_accessible(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path((role_id, screen)): Path<(RoleId, String)>,
) -> Result<Json<ScreenAccessResponse>, AppError> {
    let accessible = state.permissions.is_screen_accessible(role_id, &screen).await?;
    Ok(Json(ScreenAccessResponse {
        role_id,
        screen_name: screen,
        accessible,
    }))
}

#[utoipa::path(
    post,
    path = "/api/permissions/roles/{role_id}/grant-all",
    params(
        ("role_id" = i64, Path, description = "Role ID")
    ),
    request_body(content = BulkGrantDto, description = "Screens to grant; the whole catalog when empty"),
    responses(
        (status = 200, description = "Every screen granted", body = BulkGrantReport),
        (status = 207, description = "Some screens failed; granted ones are kept", body = BulkGrantReport),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "ADMIN authority required"),
        (status = 404, description = "Role not found")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn bulk_grant_all(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(role_id): Path<RoleId>,
    body: Bytes,
) -> Result<(StatusCode, Json<BulkGrantReport>), AppError> {
    let dto: BulkGrantDto = if body.iter().all(u8::is_ascii_whitespace) {
        BulkGrantDto::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::bad_request(anyhow::anyhow!("Invalid request body: {}", e)))?
    };

    let report = state.permissions.bulk_grant_all(role_id, dto.screens).await?;
    let status = if report.is_complete() {
        StatusCode::OK
    } else {
        StatusCode::MULTI_STATUS
    };
    Ok((status, Json(report)))
}

#[utoipa::path(
    get,
    path = "/api/me/permissions",
    responses(
        (status = 200, description = "Caller's permissions merged over all of their roles", body = EffectivePermissionsResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn my_permissions(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<EffectivePermissionsResponse>, AppError> {
    let mut screens = state
        .permissions
        .effective_for_roles(&auth_user.role_ids())
        .await?;

    let is_admin = auth_user.is_admin();
    if is_admin {
        for name in state.catalog().names() {
            screens.insert(name, PermissionFlags::READ_WRITE);
        }
    }

    Ok(Json(EffectivePermissionsResponse {
        username: auth_user.username().to_string(),
        is_admin,
        screens,
    }))
}
