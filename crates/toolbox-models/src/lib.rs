//! # Toolbox Models
//!
//! Domain models and DTOs for the Toolbox API.
//!
//! # Modules
//!
//! - [`ids`]: strongly-typed identifiers
//! - [`permissions`]: permission flags, records and request/response DTOs
//! - [`roles`]: roles and role DTOs
//! - [`screens`]: the screen catalog
//!
//! The central invariant of the permission model lives in
//! [`PermissionFlags`]: a value granting write without read cannot be
//! constructed, deserialized, or decoded from a database row.
//!
//! # Example
//!
//! ```ignore
//! use toolbox_models::{PermissionFlags, AccessLevel};
//!
//! let flags = PermissionFlags::new(true, false)?;
//! assert_eq!(flags.access_level(), AccessLevel::ReadOnly);
//!
//! assert!(PermissionFlags::new(false, true).is_err());
//! ```

pub mod ids;
pub mod permissions;
pub mod roles;
pub mod screens;

// Re-export commonly used types at crate root for convenience
pub use ids::{PermissionId, RoleId};

pub use permissions::{
    AccessLevel, BulkGrantDto, BulkGrantFailure, BulkGrantReport, EffectivePermissionsResponse,
    InvalidPermissionState, PermissionDto, PermissionFlags, PermissionRecord,
    PermissionStateResponse, SavePermissionDto, ScreenAccessResponse,
};

pub use roles::{PaginatedRolesResponse, Role, RoleFilterParams, RoleSummary, SaveRoleDto};

pub use screens::{CatalogError, DefaultPermission, ScreenCatalog, ScreenDefinition};

/// Rejects values that are empty once surrounding whitespace is removed.
pub(crate) fn validate_not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        let mut err = validator::ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}
