use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use toolbox_auth::{Claims, verify_token};
use toolbox_core::AppError;
use toolbox_models::RoleId;

use crate::state::AppState;

/// Extractor that validates the bearer JWT and exposes the caller's claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn username(&self) -> &str {
        &self.0.sub
    }

    pub fn role_ids(&self) -> Vec<RoleId> {
        self.0.role_ids.iter().copied().map(RoleId::new).collect()
    }

    pub fn has_role(&self, role_id: RoleId) -> bool {
        self.0.role_ids.contains(&role_id.into_inner())
    }

    pub fn is_admin(&self) -> bool {
        self.0.is_admin()
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::unauthorized("Invalid authorization header format".to_string())
        })?;

        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}

/// Authenticated caller holding the `ADMIN` authority.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_user = AuthUser::from_request_parts(parts, state).await?;

        if !auth_user.is_admin() {
            return Err(AppError::forbidden(
                "Access denied. ADMIN authority required".to_string(),
            ));
        }

        Ok(RequireAdmin(auth_user))
    }
}
