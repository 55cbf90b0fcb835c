use async_trait::async_trait;
use toolbox_models::{PermissionDto, PermissionRecord, RoleId, RoleSummary, SavePermissionDto};

use crate::ClientError;

/// Remote permission operations used by the console.
#[async_trait]
pub trait PermissionApi: Send + Sync {
    async fn find_by_role_id(&self, role_id: RoleId) -> Result<Vec<PermissionDto>, ClientError>;

    async fn save_permission(
        &self,
        request: &SavePermissionDto,
    ) -> Result<PermissionRecord, ClientError>;

    async fn get_all_roles(&self) -> Result<Vec<RoleSummary>, ClientError>;
}
