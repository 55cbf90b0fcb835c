//! Storage ports for roles and permissions.
//!
//! Services depend on these traits only. Two adapters exist:
//!
//! - [`PgRepository`]: PostgreSQL via sqlx
//! - [`MemoryRepository`]: process-local maps, used by tests and
//!   `STORAGE_BACKEND=memory` runs
//!
//! Adapters report a duplicate role name as `409 Conflict` and any storage
//! failure as `500`; absence is `Ok(None)` / `Ok(false)` so services decide
//! what is a `404`.

use async_trait::async_trait;
use toolbox_core::AppResult;
use toolbox_models::{PermissionFlags, PermissionRecord, Role, RoleFilterParams, RoleId, RoleSummary};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

/// Repository port for roles.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// One page of roles ordered by name, plus the total matching the filter.
    async fn list(&self, filter: &RoleFilterParams) -> AppResult<(Vec<Role>, i64)>;

    /// Every role ordered by name.
    async fn list_summaries(&self) -> AppResult<Vec<RoleSummary>>;

    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>>;

    /// Exact, case-sensitive name match.
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    async fn insert(&self, name: &str, description: Option<&str>) -> AppResult<Role>;

    /// Returns `None` when no role has `id`.
    async fn update(&self, id: RoleId, name: &str, description: Option<&str>)
    -> AppResult<Option<Role>>;

    /// Deletes the role and its permission records. Returns whether it existed.
    async fn delete(&self, id: RoleId) -> AppResult<bool>;
}

/// Repository port for permission records.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    async fn find(&self, role_id: RoleId, screen_name: &str) -> AppResult<Option<PermissionRecord>>;

    /// Explicit records of one role ordered by screen name.
    async fn list_by_role(&self, role_id: RoleId) -> AppResult<Vec<PermissionRecord>>;

    /// Explicit records of several roles.
    async fn list_by_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<PermissionRecord>>;

    /// Inserts or replaces the record for `(role_id, screen_name)` atomically.
    async fn upsert(
        &self,
        role_id: RoleId,
        screen_name: &str,
        flags: PermissionFlags,
    ) -> AppResult<PermissionRecord>;

    async fn count(&self) -> AppResult<i64>;
}
