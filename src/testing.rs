//! Helpers for driving the API against the in-memory backend.

use std::sync::Arc;

use axum::Router;
use toolbox_config::{CorsConfig, JwtConfig};
use toolbox_core::screens::{ADMIN_AUTHORITY, USER_AUTHORITY};
use toolbox_models::{RoleId, ScreenCatalog};

use crate::cli::issue_token;
use crate::repository::MemoryRepository;
use crate::router::init_router;
use crate::state::AppState;

pub const TEST_JWT_SECRET: &str = "toolbox-test-secret";

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: TEST_JWT_SECRET.to_string(),
        access_token_expiry: 3600,
    }
}

pub struct TestApp {
    pub state: AppState,
    pub repo: Arc<MemoryRepository>,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_catalog(ScreenCatalog::default_catalog())
    }

    pub fn with_catalog(catalog: ScreenCatalog) -> Self {
        let (state, repo) = AppState::in_memory(catalog, test_jwt_config(), CorsConfig::default());
        let router = init_router(state.clone());
        Self {
            state,
            repo,
            router,
        }
    }

    pub fn admin_token(&self) -> String {
        self.token("admin", &[], &[ADMIN_AUTHORITY])
    }

    pub fn user_token(&self, role_ids: &[RoleId]) -> String {
        self.token("user", role_ids, &[USER_AUTHORITY])
    }

    pub fn token(&self, username: &str, role_ids: &[RoleId], authorities: &[&str]) -> String {
        let authorities: Vec<String> = authorities.iter().map(|a| a.to_string()).collect();
        issue_token(&self.state.jwt_config, username, role_ids, &authorities)
            .expect("token should be issued")
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
