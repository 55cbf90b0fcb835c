//! Permission policy engine.
//!
//! Answers whether a role may view or change a screen and accepts updates
//! under the write-implies-read rule. A (role, screen) pair without a record
//! is denied.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::anyhow;
use serde::Serialize;
use toolbox_cache::{RedisCache, hash_key_parts, invalidate};
use toolbox_core::{AppError, AppResult};
use toolbox_models::{
    BulkGrantFailure, BulkGrantReport, PermissionDto, PermissionFlags, PermissionRecord, RoleId,
    ScreenCatalog,
};
use tracing::{debug, info, instrument, warn};

use crate::metrics;
use crate::repository::{PermissionRepository, RoleRepository};

/// Outcome of applying the catalog's default permissions.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DefaultsReport {
    pub applied: usize,
    /// `(screen, role)` entries that asked for write without read.
    pub invalid: Vec<(String, String)>,
    /// Role names referenced by the catalog that do not exist.
    pub missing_roles: Vec<String>,
}

#[derive(Clone)]
pub struct PermissionService {
    roles: Arc<dyn RoleRepository>,
    permissions: Arc<dyn PermissionRepository>,
    catalog: Arc<ScreenCatalog>,
    cache: Option<RedisCache>,
}

impl PermissionService {
    pub fn new(
        roles: Arc<dyn RoleRepository>,
        permissions: Arc<dyn PermissionRepository>,
        catalog: Arc<ScreenCatalog>,
        cache: Option<RedisCache>,
    ) -> Self {
        Self {
            roles,
            permissions,
            catalog,
            cache,
        }
    }

    pub fn catalog(&self) -> &ScreenCatalog {
        &self.catalog
    }

    /// Stored flags, or [`PermissionFlags::DENIED`] when no record exists.
    /// Unknown roles and screens are denied, not errors.
    #[instrument(skip(self))]
    pub async fn get_permission(
        &self,
        role_id: RoleId,
        screen_name: &str,
    ) -> AppResult<PermissionFlags> {
        let screen_name = normalize_screen(screen_name);
        if screen_name.is_empty() {
            return Ok(PermissionFlags::DENIED);
        }
        let record = self.permissions.find(role_id, screen_name).await?;
        Ok(record.map(|r| r.flags).unwrap_or(PermissionFlags::DENIED))
    }

    #[instrument(skip(self))]
    pub async fn is_screen_accessible(&self, role_id: RoleId, screen_name: &str) -> AppResult<bool> {
        Ok(self.get_permission(role_id, screen_name).await?.can_read())
    }

    /// Creates or replaces the record for `(role_id, screen_name)`.
    ///
    /// Write without read is refused before anything is looked up or stored;
    /// flags are never coerced into a valid state.
    #[instrument(skip(self))]
    pub async fn set_permission(
        &self,
        role_id: RoleId,
        screen_name: &str,
        can_read: bool,
        can_write: bool,
    ) -> AppResult<PermissionRecord> {
        let flags = PermissionFlags::new(can_read, can_write).map_err(|e| {
            metrics::track_permission_rejected("write_without_read");
            AppError::unprocessable(e)
        })?;

        let screen_name = normalize_screen(screen_name);
        if screen_name.is_empty() {
            metrics::track_permission_rejected("blank_screen");
            return Err(AppError::unprocessable(anyhow!(
                "Screen name cannot be empty"
            )));
        }

        if self.roles.find_by_id(role_id).await?.is_none() {
            metrics::track_permission_rejected("unknown_role");
            return Err(AppError::not_found(anyhow!(
                "Role not found with ID: {}",
                role_id
            )));
        }

        if !self.catalog.is_empty() && !self.catalog.contains(screen_name) {
            metrics::track_permission_rejected("unknown_screen");
            return Err(AppError::not_found(anyhow!(
                "Screen not found: {}",
                screen_name
            )));
        }

        let record = self.permissions.upsert(role_id, screen_name, flags).await?;
        invalidate::role_permissions(self.cache.as_ref(), role_id).await;
        metrics::track_permission_saved(flags.access_level());

        info!(
            %role_id,
            screen = %screen_name,
            can_read = flags.can_read(),
            can_write = flags.can_write(),
            "Permission saved"
        );
        Ok(record)
    }

    /// Grants read and write on each screen independently. Earlier grants are
    /// kept when a later one fails.
    #[instrument(skip(self))]
    pub async fn bulk_grant_all(
        &self,
        role_id: RoleId,
        screens: Option<Vec<String>>,
    ) -> AppResult<BulkGrantReport> {
        if self.roles.find_by_id(role_id).await?.is_none() {
            return Err(AppError::not_found(anyhow!(
                "Role not found with ID: {}",
                role_id
            )));
        }

        let screens = screens.unwrap_or_else(|| self.catalog.names());
        let mut report = BulkGrantReport::new(role_id);

        for screen_name in screens {
            match self.set_permission(role_id, &screen_name, true, true).await {
                Ok(_) => report.granted.push(screen_name),
                Err(e) => {
                    warn!(%role_id, screen = %screen_name, error = %e.error, "Grant failed");
                    report.failed.push(BulkGrantFailure {
                        screen_name,
                        error: e.error.to_string(),
                    });
                }
            }
        }

        metrics::track_bulk_grant(report.is_complete());
        info!(
            %role_id,
            granted = report.granted.len(),
            failed = report.failed.len(),
            "Bulk grant finished"
        );
        Ok(report)
    }

    /// Explicit records of a role ordered by screen name. No implicit-deny rows.
    #[instrument(skip(self))]
    pub async fn list_by_role(&self, role_id: RoleId) -> AppResult<Vec<PermissionRecord>> {
        if let Some(cache) = &self.cache {
            let key = cache.keys().role_permissions(role_id);
            if let Some(records) = cache.get::<Vec<PermissionRecord>>(&key).await {
                return Ok(records);
            }
            let records = self.permissions.list_by_role(role_id).await?;
            if let Err(e) = cache.set(&key, &records).await {
                warn!(error = %e, %role_id, "Failed to cache role permissions");
            }
            return Ok(records);
        }

        self.permissions.list_by_role(role_id).await
    }

    /// Permission records of a role with its name; empty for an unknown role.
    #[instrument(skip(self))]
    pub async fn find_by_role_id(&self, role_id: RoleId) -> AppResult<Vec<PermissionDto>> {
        let Some(role) = self.roles.find_by_id(role_id).await? else {
            debug!(%role_id, "Role not found, returning no permissions");
            return Ok(Vec::new());
        };

        let records = self.list_by_role(role_id).await?;
        Ok(records
            .into_iter()
            .map(|r| PermissionDto::from_record(r, role.name.clone()))
            .collect())
    }

    /// Union of flags over several roles, keyed by screen name.
    #[instrument(skip(self))]
    pub async fn effective_for_roles(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<BTreeMap<String, PermissionFlags>> {
        if role_ids.is_empty() {
            return Ok(BTreeMap::new());
        }

        let mut ids = role_ids.to_vec();
        ids.sort();
        ids.dedup();

        let cache_key = self
            .cache
            .as_ref()
            .map(|c| c.keys().effective_permissions(&hash_key_parts(&ids)));
        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            if let Some(effective) = cache.get(key).await {
                return Ok(effective);
            }
        }

        let mut effective: BTreeMap<String, PermissionFlags> = BTreeMap::new();
        for record in self.permissions.list_by_roles(&ids).await? {
            let entry = effective.entry(record.screen_name).or_default();
            *entry = entry.union(record.flags);
        }

        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            if let Err(e) = cache.set(key, &effective).await {
                warn!(error = %e, "Failed to cache effective permissions");
            }
        }
        Ok(effective)
    }

    /// Applies the catalog's default permissions to roles that exist by name.
    /// Entries asking for write without read are skipped and logged.
    #[instrument(skip(self, catalog))]
    pub async fn apply_defaults(&self, catalog: &ScreenCatalog) -> AppResult<DefaultsReport> {
        let mut report = DefaultsReport::default();

        for screen in catalog.screens() {
            for (role_name, default) in &screen.default_permissions {
                let flags = match default.flags() {
                    Ok(flags) => flags,
                    Err(e) => {
                        warn!(screen = %screen.title, role = %role_name, error = %e, "Skipping invalid default permission");
                        report.invalid.push((screen.title.clone(), role_name.clone()));
                        continue;
                    }
                };

                let Some(role) = self.roles.find_by_name(role_name).await? else {
                    if !report.missing_roles.contains(role_name) {
                        debug!(role = %role_name, "Default permission references unknown role");
                        report.missing_roles.push(role_name.clone());
                    }
                    continue;
                };

                self.set_permission(role.id, &screen.title, flags.can_read(), flags.can_write())
                    .await?;
                report.applied += 1;
            }
        }

        info!(
            applied = report.applied,
            invalid = report.invalid.len(),
            missing_roles = report.missing_roles.len(),
            "Default permissions applied"
        );
        Ok(report)
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.permissions.count().await
    }
}

/// Screen names are stored and looked up without surrounding whitespace.
fn normalize_screen(screen_name: &str) -> &str {
    screen_name.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;
    use toolbox_models::InvalidPermissionState;

    async fn setup(catalog: ScreenCatalog) -> (PermissionService, Arc<MemoryRepository>, RoleId) {
        let repo = Arc::new(MemoryRepository::new());
        let role = crate::repository::RoleRepository::insert(repo.as_ref(), "ADMINISTRATOR", None)
            .await
            .unwrap();
        let service = PermissionService::new(repo.clone(), repo.clone(), Arc::new(catalog), None);
        (service, repo, role.id)
    }

    fn abc_catalog() -> ScreenCatalog {
        ScreenCatalog::from_json(
            r#"{"screens": [
                {"id": 1, "title": "A", "order": 1},
                {"id": 2, "title": "B", "order": 2},
                {"id": 3, "title": "C", "order": 3}
            ]}"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_missing_record_is_denied() {
        let (service, _, role) = setup(ScreenCatalog::default_catalog()).await;
        assert_eq!(
            service.get_permission(role, "Reports").await.unwrap(),
            PermissionFlags::DENIED
        );
        assert!(!service.is_screen_accessible(role, "Reports").await.unwrap());
        // Unknown role and unknown screen are denied too.
        assert_eq!(
            service
                .get_permission(RoleId::new(999), "Nowhere")
                .await
                .unwrap(),
            PermissionFlags::DENIED
        );
    }

    #[tokio::test]
    async fn test_write_without_read_is_rejected_and_state_unchanged() {
        let (service, repo, role) = setup(ScreenCatalog::default_catalog()).await;
        service
            .set_permission(role, "Users", true, false)
            .await
            .unwrap();

        let err = service
            .set_permission(role, "Users", false, true)
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 422);
        assert!(err.downcast_ref::<InvalidPermissionState>().is_some());
        assert_eq!(
            service.get_permission(role, "Users").await.unwrap(),
            PermissionFlags::READ_ONLY
        );
        assert_eq!(PermissionRepository::count(repo.as_ref()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_invalid_flags_checked_before_role_lookup() {
        let (service, _, _) = setup(ScreenCatalog::default_catalog()).await;
        let err = service
            .set_permission(RoleId::new(999), "Users", false, true)
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 422);
    }

    #[tokio::test]
    async fn test_upgrade_and_revoke() {
        let (service, repo, role) = setup(ScreenCatalog::default_catalog()).await;

        service.set_permission(role, "Users", true, false).await.unwrap();
        service.set_permission(role, "Users", true, true).await.unwrap();
        assert_eq!(
            service.get_permission(role, "Users").await.unwrap(),
            PermissionFlags::READ_WRITE
        );
        assert_eq!(PermissionRepository::count(repo.as_ref()).await.unwrap(), 1);

        service.set_permission(role, "Users", false, false).await.unwrap();
        assert_eq!(
            service.get_permission(role, "Users").await.unwrap(),
            PermissionFlags::DENIED
        );
    }

    #[tokio::test]
    async fn test_idempotent_grant_keeps_one_record() {
        let (service, repo, role) = setup(ScreenCatalog::default_catalog()).await;
        let first = service.set_permission(role, "Reports", true, true).await.unwrap();
        let second = service.set_permission(role, "Reports", true, true).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(PermissionRepository::count(repo.as_ref()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_role_and_screen_are_not_found() {
        let (service, _, role) = setup(ScreenCatalog::default_catalog()).await;

        let err = service
            .set_permission(RoleId::new(999), "Users", true, false)
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = service
            .set_permission(role, "Payroll", true, false)
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = service.set_permission(role, "  ", true, false).await.unwrap_err();
        assert_eq!(err.status.as_u16(), 422);
    }

    #[tokio::test]
    async fn test_padded_screen_name_reads_back_what_was_saved() {
        let (service, _, role) = setup(ScreenCatalog::default_catalog()).await;
        let record = service
            .set_permission(role, " Users ", true, true)
            .await
            .unwrap();
        assert_eq!(record.screen_name, "Users");

        for name in [" Users ", "Users", "Users\t"] {
            assert_eq!(
                service.get_permission(role, name).await.unwrap(),
                PermissionFlags::READ_WRITE
            );
            assert!(service.is_screen_accessible(role, name).await.unwrap());
        }
        assert_eq!(
            service.get_permission(role, "   ").await.unwrap(),
            PermissionFlags::DENIED
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_saves_on_distinct_screens_keep_their_own_flags() {
        let (service, repo, role) = setup(ScreenCatalog::default_catalog()).await;
        let names = service.catalog().names();
        let wanted = |i: usize| match i % 3 {
            0 => (true, true),
            1 => (true, false),
            _ => (false, false),
        };

        let mut set = tokio::task::JoinSet::new();
        for (i, name) in names.iter().cloned().enumerate() {
            let service = service.clone();
            let (r, w) = wanted(i);
            set.spawn(async move { service.set_permission(role, &name, r, w).await });
        }
        while let Some(result) = set.join_next().await {
            result.unwrap().unwrap();
        }

        for (i, name) in names.iter().enumerate() {
            let (r, w) = wanted(i);
            assert_eq!(
                service.get_permission(role, name).await.unwrap(),
                PermissionFlags::new(r, w).unwrap(),
                "screen {name}"
            );
        }
        assert_eq!(
            PermissionRepository::count(repo.as_ref()).await.unwrap(),
            names.len() as i64
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_saves_on_same_screen_leave_one_valid_record() {
        let (service, repo, role) = setup(ScreenCatalog::default_catalog()).await;

        let mut set = tokio::task::JoinSet::new();
        for i in 0..32 {
            let service = service.clone();
            let (r, w) = match i % 4 {
                0 => (true, true),
                1 => (true, false),
                2 => (false, false),
                _ => (false, true),
            };
            set.spawn(async move { service.set_permission(role, "Users", r, w).await });
        }
        let mut rejected = 0;
        while let Some(result) = set.join_next().await {
            if let Err(e) = result.unwrap() {
                assert_eq!(e.status.as_u16(), 422);
                rejected += 1;
            }
        }
        assert_eq!(rejected, 8);

        let records = service.list_by_role(role).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(PermissionRepository::count(repo.as_ref()).await.unwrap(), 1);
        let flags = records[0].flags;
        assert!(!flags.can_write() || flags.can_read());
    }

    #[tokio::test]
    async fn test_every_call_sequence_keeps_write_implying_read() {
        let (service, _, role) = setup(abc_catalog()).await;
        let calls: Vec<(&str, bool, bool)> = ["A", "B"]
            .into_iter()
            .flat_map(|screen| {
                [(false, false), (true, false), (true, true), (false, true)]
                    .into_iter()
                    .map(move |(r, w)| (screen, r, w))
            })
            .collect();

        // Every ordered sequence of three calls over two screens.
        for first in &calls {
            for second in &calls {
                for third in &calls {
                    for screen in ["A", "B"] {
                        service.set_permission(role, screen, false, false).await.unwrap();
                    }
                    for &(screen, r, w) in [first, second, third] {
                        let before = service.get_permission(role, screen).await.unwrap();
                        let result = service.set_permission(role, screen, r, w).await;
                        let after = service.get_permission(role, screen).await.unwrap();

                        assert!(!after.can_write() || after.can_read());
                        if w && !r {
                            assert!(result.is_err());
                            assert_eq!(after, before);
                        } else {
                            assert!(result.is_ok());
                            assert_eq!((after.can_read(), after.can_write()), (r, w));
                        }
                    }
                }
            }
        }
    }

    #[tokio::test]
    async fn test_empty_catalog_accepts_any_screen() {
        let (service, _, role) = setup(ScreenCatalog::default()).await;
        assert!(service.set_permission(role, "Anything", true, false).await.is_ok());
    }

    #[tokio::test]
    async fn test_bulk_grant_reports_partial_failure() {
        let (service, repo, role) = setup(abc_catalog()).await;
        repo.fail_upserts_for("B").await;

        let report = service.bulk_grant_all(role, None).await.unwrap();
        assert_eq!(report.granted, vec!["A".to_string(), "C".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].screen_name, "B");
        assert!(!report.is_complete());

        assert_eq!(
            service.get_permission(role, "A").await.unwrap(),
            PermissionFlags::READ_WRITE
        );
        assert_eq!(
            service.get_permission(role, "C").await.unwrap(),
            PermissionFlags::READ_WRITE
        );
        assert_eq!(
            service.get_permission(role, "B").await.unwrap(),
            PermissionFlags::DENIED
        );
    }

    #[tokio::test]
    async fn test_bulk_grant_unknown_role_writes_nothing() {
        let (service, repo, _) = setup(abc_catalog()).await;
        let err = service
            .bulk_grant_all(RoleId::new(42), None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(PermissionRepository::count(repo.as_ref()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_by_role_id() {
        let (service, _, role) = setup(ScreenCatalog::default_catalog()).await;
        service.set_permission(role, "Users", true, false).await.unwrap();
        service.set_permission(role, "Reports", true, true).await.unwrap();

        let dtos = service.find_by_role_id(role).await.unwrap();
        assert_eq!(dtos.len(), 2);
        assert_eq!(dtos[0].screen_name, "Reports");
        assert!(dtos.iter().all(|d| d.role_name == "ADMINISTRATOR"));

        assert!(service.find_by_role_id(RoleId::new(77)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_effective_permissions_union() {
        let (service, repo, admin) = setup(ScreenCatalog::default_catalog()).await;
        let user = crate::repository::RoleRepository::insert(repo.as_ref(), "USER", None)
            .await
            .unwrap()
            .id;

        service.set_permission(admin, "Users", true, true).await.unwrap();
        service.set_permission(user, "Users", true, false).await.unwrap();
        service.set_permission(user, "Reports", true, false).await.unwrap();

        let effective = service.effective_for_roles(&[user, admin]).await.unwrap();
        assert_eq!(effective["Users"], PermissionFlags::READ_WRITE);
        assert_eq!(effective["Reports"], PermissionFlags::READ_ONLY);
        assert!(service.effective_for_roles(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_apply_defaults_skips_invalid_and_missing() {
        let catalog = ScreenCatalog::from_json(
            r#"{"screens": [
                {"id": 1, "title": "Users", "defaultPermissions": {
                    "ADMINISTRATOR": {"canRead": true, "canWrite": true},
                    "GHOST": {"canRead": true, "canWrite": false}
                }},
                {"id": 2, "title": "Reports", "defaultPermissions": {
                    "ADMINISTRATOR": {"canRead": false, "canWrite": true}
                }}
            ]}"#,
        )
        .unwrap();
        let (service, _, admin) = setup(catalog.clone()).await;

        let report = service.apply_defaults(&catalog).await.unwrap();
        assert_eq!(report.applied, 1);
        assert_eq!(
            report.invalid,
            vec![("Reports".to_string(), "ADMINISTRATOR".to_string())]
        );
        assert_eq!(report.missing_roles, vec!["GHOST".to_string()]);
        assert_eq!(
            service.get_permission(admin, "Reports").await.unwrap(),
            PermissionFlags::DENIED
        );
    }
}
