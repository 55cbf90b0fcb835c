use std::sync::Arc;

use anyhow::anyhow;
use toolbox_cache::{RedisCache, invalidate};
use toolbox_core::{AppError, AppResult, PaginationMeta};
use toolbox_models::{PaginatedRolesResponse, Role, RoleFilterParams, RoleId, RoleSummary, SaveRoleDto};
use tracing::{info, instrument};

use crate::repository::RoleRepository;

/// Role registry.
#[derive(Clone)]
pub struct RoleService {
    roles: Arc<dyn RoleRepository>,
    cache: Option<RedisCache>,
}

impl RoleService {
    pub fn new(roles: Arc<dyn RoleRepository>, cache: Option<RedisCache>) -> Self {
        Self { roles, cache }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: RoleFilterParams) -> AppResult<PaginatedRolesResponse> {
        let (data, total) = self.roles.list(&filter).await?;
        let meta = PaginationMeta::new(total, &filter.pagination, data.len());
        Ok(PaginatedRolesResponse { data, meta })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: RoleId) -> AppResult<Role> {
        self.roles
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Role not found with ID: {}", id)))
    }

    #[instrument(skip(self))]
    pub async fn find_by_name(&self, name: &str) -> AppResult<Role> {
        self.roles
            .find_by_name(name.trim())
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Role not found with name: {}", name)))
    }

    #[instrument(skip(self))]
    pub async fn get_all_roles(&self) -> AppResult<Vec<RoleSummary>> {
        self.roles.list_summaries().await
    }

    /// Inserts when `dto.id` is absent, updates otherwise. The returned flag
    /// is `true` when a role was created.
    #[instrument(skip(self))]
    pub async fn save(&self, dto: SaveRoleDto) -> AppResult<(Role, bool)> {
        let name = dto.normalized_name();
        let description = dto.normalized_description();

        match dto.id {
            None => {
                let role = self.roles.insert(name, description).await?;
                info!(role_id = %role.id, name = %role.name, "Role created");
                Ok((role, true))
            }
            Some(id) => {
                let role = self
                    .roles
                    .update(id, name, description)
                    .await?
                    .ok_or_else(|| AppError::not_found(anyhow!("Role not found with ID: {}", id)))?;
                info!(role_id = %role.id, name = %role.name, "Role updated");
                Ok((role, false))
            }
        }
    }

    /// Removes the role together with its permission records.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: RoleId) -> AppResult<()> {
        if !self.roles.delete(id).await? {
            return Err(AppError::not_found(anyhow!("Role not found with ID: {}", id)));
        }
        invalidate::role_permissions(self.cache.as_ref(), id).await;
        info!(role_id = %id, "Role deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MemoryRepository, PermissionRepository};
    use toolbox_models::PermissionFlags;

    fn service() -> (RoleService, Arc<MemoryRepository>) {
        let repo = Arc::new(MemoryRepository::new());
        (RoleService::new(repo.clone(), None), repo)
    }

    #[tokio::test]
    async fn test_save_inserts_then_updates() {
        let (service, _) = service();
        let (role, created) = service
            .save(SaveRoleDto::new("  Auditor ", Some("Reads reports".into())))
            .await
            .unwrap();
        assert!(created);
        assert_eq!(role.name, "Auditor");

        let mut dto = SaveRoleDto::new("Senior Auditor", None);
        dto.id = Some(role.id);
        let (updated, created) = service.save(dto).await.unwrap();
        assert!(!created);
        assert_eq!(updated.id, role.id);
        assert_eq!(updated.name, "Senior Auditor");
        assert_eq!(updated.description, None);
    }

    #[tokio::test]
    async fn test_update_missing_role_is_not_found() {
        let (service, _) = service();
        let mut dto = SaveRoleDto::new("Ghost", None);
        dto.id = Some(RoleId::new(404));
        assert!(service.save(dto).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_duplicate_name_is_conflict() {
        let (service, _) = service();
        service.save(SaveRoleDto::new("USER", None)).await.unwrap();
        let err = service.save(SaveRoleDto::new("USER", None)).await.unwrap_err();
        assert_eq!(err.status.as_u16(), 409);
    }

    #[tokio::test]
    async fn test_find_by_name_and_get() {
        let (service, _) = service();
        let (role, _) = service.save(SaveRoleDto::new("USER", None)).await.unwrap();
        assert_eq!(service.find_by_name("USER").await.unwrap().id, role.id);
        assert!(service.find_by_name("NOBODY").await.unwrap_err().is_not_found());
        assert!(service.get(RoleId::new(99)).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let (service, repo) = service();
        let (role, _) = service.save(SaveRoleDto::new("USER", None)).await.unwrap();
        repo.upsert(role.id, "Reports", PermissionFlags::READ_ONLY)
            .await
            .unwrap();

        service.delete(role.id).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);
        assert!(service.delete(role.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_get_all_roles_sorted() {
        let (service, _) = service();
        for name in ["USER", "ADMINISTRATOR", "AUDITOR"] {
            service.save(SaveRoleDto::new(name, None)).await.unwrap();
        }
        let names: Vec<String> = service
            .get_all_roles()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["ADMINISTRATOR", "AUDITOR", "USER"]);
    }

    #[tokio::test]
    async fn test_list_paginates() {
        let (service, _) = service();
        for i in 0..15 {
            service
                .save(SaveRoleDto::new(format!("Role {i:02}"), None))
                .await
                .unwrap();
        }
        let page = service.list(RoleFilterParams::default()).await.unwrap();
        assert_eq!(page.data.len(), 10);
        assert_eq!(page.meta.total, 15);
        assert!(page.meta.has_more);
    }
}
