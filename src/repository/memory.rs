//! In-memory repository adapter.
//!
//! All state sits behind one tokio `RwLock`; every mutation, including an
//! upsert, happens under a single write-lock acquisition.

use std::collections::{BTreeMap, HashSet};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use toolbox_core::{AppError, AppResult};
use toolbox_models::{
    PermissionFlags, PermissionId, PermissionRecord, Role, RoleFilterParams, RoleId, RoleSummary,
};

use super::{PermissionRepository, RoleRepository};

#[derive(Default)]
struct Store {
    roles: BTreeMap<RoleId, Role>,
    permissions: BTreeMap<(RoleId, String), PermissionRecord>,
    next_role_id: i64,
    next_permission_id: i64,
    failing_screens: HashSet<String>,
}

impl Store {
    fn name_taken(&self, name: &str, except: Option<RoleId>) -> bool {
        self.roles
            .values()
            .any(|r| r.name == name && Some(r.id) != except)
    }
}

fn duplicate_name(name: &str) -> AppError {
    AppError::conflict(anyhow!("A role named '{}' already exists", name))
}

#[derive(Default)]
pub struct MemoryRepository {
    store: RwLock<Store>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later upsert on `screen_name` fail with a storage error.
    pub async fn fail_upserts_for(&self, screen_name: &str) {
        self.store
            .write()
            .await
            .failing_screens
            .insert(screen_name.to_string());
    }

    pub async fn clear_failures(&self) {
        self.store.write().await.failing_screens.clear();
    }
}

#[async_trait]
impl RoleRepository for MemoryRepository {
    async fn list(&self, filter: &RoleFilterParams) -> AppResult<(Vec<Role>, i64)> {
        let store = self.store.read().await;
        let needle = filter.name.as_deref().map(str::to_lowercase);

        let mut matching: Vec<&Role> = store
            .roles
            .values()
            .filter(|r| match &needle {
                Some(n) => r.name.to_lowercase().contains(n),
                None => true,
            })
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(usize::try_from(filter.pagination.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(filter.pagination.limit()).unwrap_or(0))
            .cloned()
            .collect();

        Ok((page, total))
    }

    async fn list_summaries(&self) -> AppResult<Vec<RoleSummary>> {
        let store = self.store.read().await;
        let mut roles: Vec<RoleSummary> = store.roles.values().cloned().map(Into::into).collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.store.read().await.roles.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let store = self.store.read().await;
        Ok(store.roles.values().find(|r| r.name == name).cloned())
    }

    async fn insert(&self, name: &str, description: Option<&str>) -> AppResult<Role> {
        let mut store = self.store.write().await;
        if store.name_taken(name, None) {
            return Err(duplicate_name(name));
        }

        store.next_role_id += 1;
        let now = Utc::now();
        let role = Role {
            id: RoleId::new(store.next_role_id),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        store.roles.insert(role.id, role.clone());
        Ok(role)
    }

    async fn update(
        &self,
        id: RoleId,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Option<Role>> {
        let mut store = self.store.write().await;
        if !store.roles.contains_key(&id) {
            return Ok(None);
        }
        if store.name_taken(name, Some(id)) {
            return Err(duplicate_name(name));
        }

        let Some(role) = store.roles.get_mut(&id) else {
            return Ok(None);
        };
        role.name = name.to_string();
        role.description = description.map(str::to_string);
        role.updated_at = Utc::now();
        Ok(Some(role.clone()))
    }

    async fn delete(&self, id: RoleId) -> AppResult<bool> {
        let mut store = self.store.write().await;
        if store.roles.remove(&id).is_none() {
            return Ok(false);
        }
        store.permissions.retain(|(role_id, _), _| *role_id != id);
        Ok(true)
    }
}

#[async_trait]
impl PermissionRepository for MemoryRepository {
    async fn find(&self, role_id: RoleId, screen_name: &str) -> AppResult<Option<PermissionRecord>> {
        let store = self.store.read().await;
        Ok(store
            .permissions
            .get(&(role_id, screen_name.to_string()))
            .cloned())
    }

    async fn list_by_role(&self, role_id: RoleId) -> AppResult<Vec<PermissionRecord>> {
        let store = self.store.read().await;
        // Keys sort by (role, screen), so records come out ordered by screen.
        Ok(store
            .permissions
            .iter()
            .filter(|((r, _), _)| *r == role_id)
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn list_by_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<PermissionRecord>> {
        let store = self.store.read().await;
        Ok(store
            .permissions
            .iter()
            .filter(|((r, _), _)| role_ids.contains(r))
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn upsert(
        &self,
        role_id: RoleId,
        screen_name: &str,
        flags: PermissionFlags,
    ) -> AppResult<PermissionRecord> {
        let mut store = self.store.write().await;

        if store.failing_screens.contains(screen_name) {
            return Err(AppError::internal(anyhow!(
                "storage failure while saving permission for screen '{}'",
                screen_name
            )));
        }
        // Mirrors the foreign key of the SQL schema.
        if !store.roles.contains_key(&role_id) {
            return Err(AppError::internal(anyhow!(
                "permission references missing role {}",
                role_id
            )));
        }

        let key = (role_id, screen_name.to_string());
        let id = match store.permissions.get(&key) {
            Some(existing) => existing.id,
            None => {
                store.next_permission_id += 1;
                PermissionId::new(store.next_permission_id)
            }
        };

        let record = PermissionRecord {
            id,
            role_id,
            screen_name: screen_name.to_string(),
            flags,
        };
        store.permissions.insert(key, record.clone());
        Ok(record)
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.store.read().await.permissions.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_keeps_one_record_per_pair() {
        let repo = MemoryRepository::new();
        let role = repo.insert("ADMINISTRATOR", None).await.unwrap();

        let first = repo
            .upsert(role.id, "Users", PermissionFlags::READ_ONLY)
            .await
            .unwrap();
        let second = repo
            .upsert(role.id, "Users", PermissionFlags::READ_WRITE)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(
            repo.find(role.id, "Users").await.unwrap().unwrap().flags,
            PermissionFlags::READ_WRITE
        );
    }

    #[tokio::test]
    async fn test_delete_cascades_permissions() {
        let repo = MemoryRepository::new();
        let keep = repo.insert("USER", None).await.unwrap();
        let gone = repo.insert("AUDITOR", None).await.unwrap();
        repo.upsert(keep.id, "Reports", PermissionFlags::READ_ONLY)
            .await
            .unwrap();
        repo.upsert(gone.id, "Reports", PermissionFlags::READ_ONLY)
            .await
            .unwrap();

        assert!(repo.delete(gone.id).await.unwrap());
        assert!(!repo.delete(gone.id).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 1);
        assert!(repo.list_by_role(gone.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_names_conflict() {
        let repo = MemoryRepository::new();
        let role = repo.insert("USER", None).await.unwrap();
        let other = repo.insert("AUDITOR", None).await.unwrap();

        let err = repo.insert("USER", None).await.unwrap_err();
        assert_eq!(err.status.as_u16(), 409);

        let err = repo.update(other.id, "USER", None).await.unwrap_err();
        assert_eq!(err.status.as_u16(), 409);

        // Renaming a role to its own name is fine.
        assert!(repo.update(role.id, "USER", Some("x")).await.unwrap().is_some());
        assert!(repo.update(RoleId::new(999), "X", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_and_paginates() {
        let repo = MemoryRepository::new();
        for name in ["Gamma", "alpha", "Beta", "Alphabet"] {
            repo.insert(name, None).await.unwrap();
        }

        let filter = RoleFilterParams {
            name: Some("ALPHA".to_string()),
            ..Default::default()
        };
        let (roles, total) = repo.list(&filter).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(roles.len(), 2);

        let mut filter = RoleFilterParams::default();
        filter.pagination.limit = Some(2);
        filter.pagination.page = Some(2);
        let (roles, total) = repo.list(&filter).await.unwrap();
        assert_eq!(total, 4);
        assert_eq!(roles.len(), 2);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let repo = MemoryRepository::new();
        let role = repo.insert("USER", None).await.unwrap();
        repo.fail_upserts_for("B").await;

        let err = repo
            .upsert(role.id, "B", PermissionFlags::READ_WRITE)
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 500);
        assert!(repo.find(role.id, "B").await.unwrap().is_none());

        repo.clear_failures().await;
        assert!(repo.upsert(role.id, "B", PermissionFlags::READ_WRITE).await.is_ok());
    }
}
