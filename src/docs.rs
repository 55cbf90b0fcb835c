use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use toolbox_core::{PaginationMeta, PaginationParams};
use toolbox_models::{
    AccessLevel, BulkGrantDto, BulkGrantFailure, BulkGrantReport, DefaultPermission,
    EffectivePermissionsResponse, PaginatedRolesResponse, PermissionDto, PermissionFlags,
    PermissionRecord, PermissionStateResponse, Role, RoleFilterParams, RoleSummary,
    SavePermissionDto, SaveRoleDto, ScreenAccessResponse, ScreenDefinition,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::permissions::controller::find_by_role_id,
        crate::modules::permissions::controller::save_permission,
        crate::modules::permissions::controller::get_permission,
        crate::modules::permissions::controller::is_screen_accessible,
        crate::modules::permissions::controller::bulk_grant_all,
        crate::modules::permissions::controller::my_permissions,
        crate::modules::roles::controller::get_roles,
        crate::modules::roles::controller::get_all_roles,
        crate::modules::roles::controller::get_role_by_id,
        crate::modules::roles::controller::get_role_by_name,
        crate::modules::roles::controller::create_role,
        crate::modules::roles::controller::update_role,
        crate::modules::roles::controller::delete_role,
        crate::modules::screens::controller::get_screens,
    ),
    components(
        schemas(
            AccessLevel,
            PermissionFlags,
            PermissionRecord,
            PermissionDto,
            SavePermissionDto,
            PermissionStateResponse,
            ScreenAccessResponse,
            EffectivePermissionsResponse,
            BulkGrantDto,
            BulkGrantFailure,
            BulkGrantReport,
            Role,
            RoleSummary,
            SaveRoleDto,
            RoleFilterParams,
            PaginatedRolesResponse,
            ScreenDefinition,
            DefaultPermission,
            PaginationMeta,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Permissions", description = "Screen permissions per role"),
        (name = "Roles", description = "Role registry"),
        (name = "Screens", description = "Screen catalog")
    ),
    info(
        title = "Toolbox API",
        version = "0.1.0",
        description = "Role and screen permission management for the Toolbox admin console.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
