//! Role domain models and DTOs.

use crate::ids::RoleId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use toolbox_core::{PaginationMeta, PaginationParams, serde::deserialize_optional_trimmed};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact role projection used by the permission editor's role picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RoleSummary {
    pub id: RoleId,
    pub name: String,
    pub description: Option<String>,
}

impl From<Role> for RoleSummary {
    fn from(role: Role) -> Self {
        Self {
            id: role.id,
            name: role.name,
            description: role.description,
        }
    }
}

/// Insert when `id` is absent, update otherwise.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct SaveRoleDto {
    #[serde(default)]
    pub id: Option<RoleId>,
    #[validate(
        length(min = 1, max = 50),
        custom(function = "crate::validate_not_blank")
    )]
    pub name: String,
    #[validate(length(max = 255))]
    #[serde(default)]
    pub description: Option<String>,
}

impl SaveRoleDto {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description,
        }
    }

    /// Name as it is stored: surrounding whitespace removed.
    pub fn normalized_name(&self) -> &str {
        self.name.trim()
    }

    /// Blank descriptions are stored as `NULL`.
    pub fn normalized_description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct RoleFilterParams {
    /// Case-insensitive substring match on the role name
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedRolesResponse {
    pub data: Vec<Role>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_role_dto_validation() {
        let valid = SaveRoleDto::new("ADMINISTRATOR", Some("Full access".to_string()));
        assert!(valid.validate().is_ok());

        let empty = SaveRoleDto::new("", None);
        assert!(empty.validate().is_err());

        let blank = SaveRoleDto::new("   ", None);
        assert!(blank.validate().is_err());

        let long_name = SaveRoleDto::new("x".repeat(51), None);
        assert!(long_name.validate().is_err());

        let max_name = SaveRoleDto::new("x".repeat(50), None);
        assert!(max_name.validate().is_ok());

        let long_description = SaveRoleDto::new("Auditor", Some("d".repeat(256)));
        assert!(long_description.validate().is_err());
    }

    #[test]
    fn test_save_role_dto_normalization() {
        let dto = SaveRoleDto::new("  Auditor ", Some("   ".to_string()));
        assert_eq!(dto.normalized_name(), "Auditor");
        assert_eq!(dto.normalized_description(), None);

        let dto = SaveRoleDto::new("Auditor", Some(" Reads reports ".to_string()));
        assert_eq!(dto.normalized_description(), Some("Reads reports"));
    }

    #[test]
    fn test_role_summary_from_role() {
        let now = Utc::now();
        let role = Role {
            id: RoleId::new(4),
            name: "USER".to_string(),
            description: None,
            created_at: now,
            updated_at: now,
        };
        let summary = RoleSummary::from(role);
        assert_eq!(summary.id, RoleId::new(4));
        assert_eq!(summary.name, "USER");
    }

    #[test]
    fn test_filter_params_blank_name_is_none() {
        let params: RoleFilterParams =
            serde_json::from_str(r#"{"name":"  ","page":"2","limit":"5"}"#).unwrap();
        assert!(params.name.is_none());
        assert_eq!(params.pagination.limit(), 5);
    }
}
