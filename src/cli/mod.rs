//! Administrative operations behind the `toolbox-cli` binary.
//!
//! Each function works on an [`AppState`], so the same code path serves the
//! HTTP API and the command line.

use anyhow::{Context, anyhow};
use toolbox_auth::create_access_token;
use toolbox_config::JwtConfig;
use toolbox_models::{BulkGrantReport, Role, RoleId, SaveRoleDto};
use validator::Validate;

use crate::metrics;
use crate::modules::permissions::DefaultsReport;
use crate::state::AppState;

pub async fn create_role(
    state: &AppState,
    name: &str,
    description: Option<String>,
) -> anyhow::Result<Role> {
    let dto = SaveRoleDto::new(name, description);
    dto.validate().context("Invalid role")?;

    let (role, _) = state.roles.save(dto).await.map_err(|e| e.error)?;
    Ok(role)
}

/// Grants read and write on `screens` (or the whole catalog) to the role
/// called `role_name`.
pub async fn grant_all(
    state: &AppState,
    role_name: &str,
    screens: Option<Vec<String>>,
) -> anyhow::Result<BulkGrantReport> {
    let role = state
        .roles
        .find_by_name(role_name)
        .await
        .map_err(|e| e.error)?;

    state
        .permissions
        .bulk_grant_all(role.id, screens)
        .await
        .map_err(|e| e.error)
}

pub async fn apply_defaults(state: &AppState) -> anyhow::Result<DefaultsReport> {
    let catalog = state.catalog().clone();
    state
        .permissions
        .apply_defaults(&catalog)
        .await
        .map_err(|e| e.error)
}

/// Mints an access token for development and scripted API use.
pub fn issue_token(
    jwt_config: &JwtConfig,
    username: &str,
    role_ids: &[RoleId],
    authorities: &[String],
) -> anyhow::Result<String> {
    if username.trim().is_empty() {
        return Err(anyhow!("Username cannot be empty"));
    }
    let token = create_access_token(
        username.trim(),
        role_ids.iter().map(|id| id.into_inner()).collect(),
        authorities.iter().map(|a| a.trim().to_uppercase()).collect(),
        jwt_config,
    )
    .map_err(|e| e.error)?;
    metrics::track_token_issued();
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolbox_auth::verify_token;
    use toolbox_config::CorsConfig;
    use toolbox_core::screens;
    use toolbox_models::{PermissionFlags, ScreenCatalog};

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "cli-test-secret".to_string(),
            access_token_expiry: 600,
        }
    }

    fn state() -> AppState {
        let (state, _) =
            AppState::in_memory(ScreenCatalog::default_catalog(), jwt_config(), CorsConfig::default());
        state
    }

    #[tokio::test]
    async fn test_create_role_then_grant_all() {
        let state = state();
        let role = create_role(&state, "Operations", None).await.unwrap();

        let report = grant_all(&state, "Operations", None).await.unwrap();
        assert!(report.is_complete());
        assert_eq!(report.granted.len(), state.catalog().len());

        let flags = state
            .permissions
            .get_permission(role.id, screens::REPORTS)
            .await
            .unwrap();
        assert_eq!(flags, PermissionFlags::READ_WRITE);
    }

    #[tokio::test]
    async fn test_grant_all_unknown_role_fails() {
        let state = state();
        let err = grant_all(&state, "Nobody", None).await.unwrap_err();
        assert!(err.to_string().contains("Nobody"));
    }

    #[tokio::test]
    async fn test_create_role_rejects_blank_name() {
        let state = state();
        assert!(create_role(&state, "   ", None).await.is_err());
    }

    #[tokio::test]
    async fn test_apply_defaults_uses_existing_roles() {
        let state = state();
        create_role(&state, "USER", None).await.unwrap();

        let report = apply_defaults(&state).await.unwrap();
        assert!(report.applied > 0);
        assert!(report.missing_roles.contains(&"ADMINISTRATOR".to_string()));
    }

    #[test]
    fn test_issue_token_round_trip() {
        let config = jwt_config();
        let token = issue_token(&config, "ops", &[RoleId::new(3)], &["admin".to_string()]).unwrap();
        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "ops");
        assert_eq!(claims.role_ids, vec![3]);
        assert!(claims.is_admin());
    }

    #[test]
    fn test_issue_token_requires_username() {
        assert!(issue_token(&jwt_config(), " ", &[], &[]).is_err());
    }
}
