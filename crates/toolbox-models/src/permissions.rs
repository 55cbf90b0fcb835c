//! Permission domain models and DTOs.
//!
//! A permission ties one role to one screen with a read and a write flag.
//! Write access without read access is never representable: every path that
//! produces a [`PermissionFlags`] (constructor, JSON, database row) goes
//! through [`PermissionFlags::new`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, postgres::PgRow};
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{PermissionId, RoleId};

/// Returned when a caller asks for write access without read access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Write permission requires read permission")]
pub struct InvalidPermissionState;

/// Read/write flags for one (role, screen) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "RawFlags")]
pub struct PermissionFlags {
    can_read: bool,
    can_write: bool,
}

#[derive(Deserialize)]
struct RawFlags {
    #[serde(alias = "canRead", default)]
    can_read: bool,
    #[serde(alias = "canWrite", default)]
    can_write: bool,
}

impl TryFrom<RawFlags> for PermissionFlags {
    type Error = InvalidPermissionState;

    fn try_from(raw: RawFlags) -> Result<Self, Self::Error> {
        PermissionFlags::new(raw.can_read, raw.can_write)
    }
}

impl PermissionFlags {
    /// Implicit deny: what a (role, screen) pair without a record resolves to.
    pub const DENIED: Self = Self {
        can_read: false,
        can_write: false,
    };
    pub const READ_ONLY: Self = Self {
        can_read: true,
        can_write: false,
    };
    pub const READ_WRITE: Self = Self {
        can_read: true,
        can_write: true,
    };

    pub fn new(can_read: bool, can_write: bool) -> Result<Self, InvalidPermissionState> {
        if can_write && !can_read {
            return Err(InvalidPermissionState);
        }
        Ok(Self {
            can_read,
            can_write,
        })
    }

    #[inline]
    pub fn can_read(&self) -> bool {
        self.can_read
    }

    #[inline]
    pub fn can_write(&self) -> bool {
        self.can_write
    }

    pub fn access_level(&self) -> AccessLevel {
        match (self.can_read, self.can_write) {
            (true, true) => AccessLevel::ReadWrite,
            (true, false) => AccessLevel::ReadOnly,
            _ => AccessLevel::Denied,
        }
    }

    /// Combines the access of two roles held by the same user.
    pub fn union(self, other: Self) -> Self {
        // Both operands satisfy write-implies-read, so the union does too.
        Self {
            can_read: self.can_read || other.can_read,
            can_write: self.can_write || other.can_write,
        }
    }
}

impl From<AccessLevel> for PermissionFlags {
    fn from(level: AccessLevel) -> Self {
        match level {
            AccessLevel::Denied => Self::DENIED,
            AccessLevel::ReadOnly => Self::READ_ONLY,
            AccessLevel::ReadWrite => Self::READ_WRITE,
        }
    }
}

impl<'r> FromRow<'r, PgRow> for PermissionFlags {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let can_read: bool = row.try_get("can_read")?;
        let can_write: bool = row.try_get("can_write")?;
        PermissionFlags::new(can_read, can_write).map_err(|e| sqlx::Error::ColumnDecode {
            index: "can_write".to_string(),
            source: Box::new(e),
        })
    }
}

/// Access state of a (role, screen) pair. There is no
/// write-without-read variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    Denied,
    ReadOnly,
    ReadWrite,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Denied => "denied",
            AccessLevel::ReadOnly => "read_only",
            AccessLevel::ReadWrite => "read_write",
        }
    }
}

/// A stored permission record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PermissionRecord {
    pub id: PermissionId,
    pub role_id: RoleId,
    pub screen_name: String,
    #[serde(flatten)]
    pub flags: PermissionFlags,
}

impl<'r> FromRow<'r, PgRow> for PermissionRecord {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            role_id: row.try_get("role_id")?,
            screen_name: row.try_get("screen_name")?,
            flags: PermissionFlags::from_row(row)?,
        })
    }
}

/// Permission record joined with its role name, as returned to the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PermissionDto {
    pub id: PermissionId,
    pub role_id: RoleId,
    pub role_name: String,
    pub screen_name: String,
    #[serde(flatten)]
    pub flags: PermissionFlags,
}

impl PermissionDto {
    pub fn from_record(record: PermissionRecord, role_name: impl Into<String>) -> Self {
        Self {
            id: record.id,
            role_id: record.role_id,
            role_name: role_name.into(),
            screen_name: record.screen_name,
            flags: record.flags,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct SavePermissionDto {
    #[serde(alias = "roleId")]
    pub role_id: RoleId,
    #[serde(alias = "screenName")]
    #[validate(
        length(min = 1, max = 100),
        custom(function = "crate::validate_not_blank")
    )]
    pub screen_name: String,
    #[serde(alias = "canRead", default)]
    pub can_read: bool,
    #[serde(alias = "canWrite", default)]
    pub can_write: bool,
}

impl SavePermissionDto {
    /// Checks write-implies-read without touching anything else.
    pub fn flags(&self) -> Result<PermissionFlags, InvalidPermissionState> {
        PermissionFlags::new(self.can_read, self.can_write)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct BulkGrantDto {
    /// Screens to grant. The whole catalog when omitted.
    pub screens: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BulkGrantFailure {
    pub screen_name: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BulkGrantReport {
    pub role_id: RoleId,
    pub granted: Vec<String>,
    pub failed: Vec<BulkGrantFailure>,
}

impl BulkGrantReport {
    pub fn new(role_id: RoleId) -> Self {
        Self {
            role_id,
            granted: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PermissionStateResponse {
    pub role_id: RoleId,
    pub screen_name: String,
    pub can_read: bool,
    pub can_write: bool,
    pub access: AccessLevel,
}

impl PermissionStateResponse {
    pub fn new(role_id: RoleId, screen_name: impl Into<String>, flags: PermissionFlags) -> Self {
        Self {
            role_id,
            screen_name: screen_name.into(),
            can_read: flags.can_read(),
            can_write: flags.can_write(),
            access: flags.access_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScreenAccessResponse {
    pub role_id: RoleId,
    pub screen_name: String,
    pub accessible: bool,
}

/// Union of the caller's permissions across all of their roles.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EffectivePermissionsResponse {
    pub username: String,
    pub is_admin: bool,
    pub screens: BTreeMap<String, PermissionFlags>,
}
