use std::sync::Arc;

use toolbox_cache::{CacheConfig, RedisCache};
use toolbox_config::{CorsConfig, DatabaseConfig, JwtConfig, ScreensConfig, StorageBackend};
use toolbox_db::{init_db_pool, run_migrations};
use toolbox_models::screens::{DEFAULT_ADMIN_ROLE, DEFAULT_USER_ROLE};
use toolbox_models::{CatalogError, ScreenCatalog};
use tracing::{info, warn};

use crate::modules::permissions::PermissionService;
use crate::modules::roles::RoleService;
use crate::repository::{MemoryRepository, PermissionRepository, PgRepository, RoleRepository};

#[derive(Clone)]
pub struct AppState {
    pub roles: RoleService,
    pub permissions: PermissionService,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(
        roles: Arc<dyn RoleRepository>,
        permissions: Arc<dyn PermissionRepository>,
        catalog: ScreenCatalog,
        cache: Option<RedisCache>,
        jwt_config: JwtConfig,
        cors_config: CorsConfig,
    ) -> Self {
        Self {
            roles: RoleService::new(roles.clone(), cache.clone()),
            permissions: PermissionService::new(roles, permissions, Arc::new(catalog), cache),
            jwt_config,
            cors_config,
        }
    }

    /// State backed by a fresh [`MemoryRepository`], returned alongside it.
    pub fn in_memory(
        catalog: ScreenCatalog,
        jwt_config: JwtConfig,
        cors_config: CorsConfig,
    ) -> (Self, Arc<MemoryRepository>) {
        let repo = Arc::new(MemoryRepository::new());
        let state = Self::new(
            repo.clone(),
            repo.clone(),
            catalog,
            None,
            jwt_config,
            cors_config,
        );
        (state, repo)
    }

    pub fn catalog(&self) -> &ScreenCatalog {
        self.permissions.catalog()
    }
}

/// Loads the configured catalog file, or the built-in catalog when none is set.
pub fn load_catalog(config: &ScreensConfig) -> Result<ScreenCatalog, CatalogError> {
    match &config.config_file {
        Some(path) => {
            let catalog = ScreenCatalog::from_file(path)?;
            info!(path = %path.display(), screens = catalog.len(), "Loaded screen catalog");
            Ok(catalog)
        }
        None => Ok(ScreenCatalog::default_catalog()),
    }
}

/// Connects to Redis when caching is enabled. A connection failure disables
/// the cache instead of aborting startup.
pub async fn connect_cache(config: &CacheConfig) -> Option<RedisCache> {
    if !config.enabled {
        return None;
    }
    match RedisCache::connect(config).await {
        Ok(cache) => Some(cache),
        Err(e) => {
            warn!(error = %e, "Redis unavailable, continuing without cache");
            None
        }
    }
}

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let db_config = DatabaseConfig::from_env();
    let screens_config = ScreensConfig::from_env();
    let catalog = load_catalog(&screens_config)?;
    let cache = connect_cache(&CacheConfig::from_env()).await;

    let (roles, permissions): (Arc<dyn RoleRepository>, Arc<dyn PermissionRepository>) =
        match db_config.backend {
            StorageBackend::Postgres => {
                let pool = init_db_pool(&db_config).await?;
                run_migrations(&pool).await?;
                let repo = Arc::new(PgRepository::new(pool));
                (repo.clone(), repo)
            }
            StorageBackend::Memory => {
                warn!("Using in-memory storage; data is lost on restart");
                let repo = Arc::new(MemoryRepository::new());
                for name in [DEFAULT_ADMIN_ROLE, DEFAULT_USER_ROLE] {
                    repo.insert(name, None).await.map_err(|e| e.error)?;
                }
                (repo.clone(), repo)
            }
        };

    let state = AppState::new(
        roles,
        permissions,
        catalog,
        cache,
        JwtConfig::from_env(),
        CorsConfig::from_env(),
    );

    if screens_config.load_default_permissions {
        let catalog = state.catalog().clone();
        state
            .permissions
            .apply_defaults(&catalog)
            .await
            .map_err(|e| e.error)?;
    } else {
        info!("Default permissions loading is disabled");
    }

    Ok(state)
}
