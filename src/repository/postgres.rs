//! PostgreSQL repository adapter.

use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::PgPool;
use toolbox_core::{AppError, AppResult};
use toolbox_models::{
    PermissionFlags, PermissionRecord, Role, RoleFilterParams, RoleId, RoleSummary,
};
use tracing::instrument;

use super::{PermissionRepository, RoleRepository};

const ROLE_COLUMNS: &str = "id, name, description, created_at, updated_at";
const PERMISSION_COLUMNS: &str = "id, role_id, screen_name, can_read, can_write";

#[derive(Clone, Debug)]
pub struct PgRepository {
    db: PgPool,
}

impl PgRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Maps a unique-violation on the role name to `409`, everything else to `500`.
fn map_role_write_error(err: sqlx::Error, name: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AppError::conflict(anyhow!("A role named '{}' already exists", name));
        }
    }
    AppError::from(err)
}

/// Escapes `LIKE` wildcards so the filter is a plain substring match.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl RoleRepository for PgRepository {
    #[instrument(skip(self))]
    async fn list(&self, filter: &RoleFilterParams) -> AppResult<(Vec<Role>, i64)> {
        let pattern = filter.name.as_deref().map(like_pattern);

        let roles: Vec<Role> = sqlx::query_as(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles
             WHERE ($1::TEXT IS NULL OR name ILIKE $1)
             ORDER BY name
             LIMIT $2 OFFSET $3"
        ))
        .bind(pattern.as_deref())
        .bind(filter.pagination.limit())
        .bind(filter.pagination.offset())
        .fetch_all(&self.db)
        .await?;

        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM roles WHERE ($1::TEXT IS NULL OR name ILIKE $1)")
                .bind(pattern.as_deref())
                .fetch_one(&self.db)
                .await?;

        Ok((roles, total.0))
    }

    #[instrument(skip(self))]
    async fn list_summaries(&self) -> AppResult<Vec<RoleSummary>> {
        let roles = sqlx::query_as("SELECT id, name, description FROM roles ORDER BY name")
            .fetch_all(&self.db)
            .await?;
        Ok(roles)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>> {
        let role = sqlx::query_as(&format!("SELECT {ROLE_COLUMNS} FROM roles WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(role)
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let role = sqlx::query_as(&format!("SELECT {ROLE_COLUMNS} FROM roles WHERE name = $1"))
            .bind(name)
            .fetch_optional(&self.db)
            .await?;
        Ok(role)
    }

    #[instrument(skip(self))]
    async fn insert(&self, name: &str, description: Option<&str>) -> AppResult<Role> {
        sqlx::query_as(&format!(
            "INSERT INTO roles (name, description) VALUES ($1, $2) RETURNING {ROLE_COLUMNS}"
        ))
        .bind(name)
        .bind(description)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_role_write_error(e, name))
    }

    #[instrument(skip(self))]
    async fn update(
        &self,
        id: RoleId,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Option<Role>> {
        sqlx::query_as(&format!(
            "UPDATE roles SET name = $2, description = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {ROLE_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| map_role_write_error(e, name))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: RoleId) -> AppResult<bool> {
        // permissions.role_id is ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PermissionRepository for PgRepository {
    #[instrument(skip(self))]
    async fn find(&self, role_id: RoleId, screen_name: &str) -> AppResult<Option<PermissionRecord>> {
        let record = sqlx::query_as(&format!(
            "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE role_id = $1 AND screen_name = $2"
        ))
        .bind(role_id)
        .bind(screen_name)
        .fetch_optional(&self.db)
        .await?;
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn list_by_role(&self, role_id: RoleId) -> AppResult<Vec<PermissionRecord>> {
        let records = sqlx::query_as(&format!(
            "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE role_id = $1 ORDER BY screen_name"
        ))
        .bind(role_id)
        .fetch_all(&self.db)
        .await?;
        Ok(records)
    }

    #[instrument(skip(self))]
    async fn list_by_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<PermissionRecord>> {
        let records = sqlx::query_as(&format!(
            "SELECT {PERMISSION_COLUMNS} FROM permissions
             WHERE role_id = ANY($1)
             ORDER BY screen_name, role_id"
        ))
        .bind(role_ids)
        .fetch_all(&self.db)
        .await?;
        Ok(records)
    }

    #[instrument(skip(self))]
    async fn upsert(
        &self,
        role_id: RoleId,
        screen_name: &str,
        flags: PermissionFlags,
    ) -> AppResult<PermissionRecord> {
        // Single statement: concurrent saves of the same pair serialize on the
        // unique constraint and the last writer wins.
        let record = sqlx::query_as(&format!(
            "INSERT INTO permissions (role_id, screen_name, can_read, can_write)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (role_id, screen_name)
             DO UPDATE SET can_read = EXCLUDED.can_read,
                           can_write = EXCLUDED.can_write,
                           updated_at = NOW()
             RETURNING {PERMISSION_COLUMNS}"
        ))
        .bind(role_id)
        .bind(screen_name)
        .bind(flags.can_read())
        .bind(flags.can_write())
        .fetch_one(&self.db)
        .await?;
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM permissions")
            .fetch_one(&self.db)
            .await?;
        Ok(total.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("adm"), "%adm%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
