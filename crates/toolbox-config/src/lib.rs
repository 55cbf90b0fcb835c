//! # Toolbox Config
//!
//! Configuration types for the Toolbox API.
//!
//! Every structure is loaded from environment variables with sensible
//! defaults:
//!
//! - [`jwt`]: JWT authentication configuration
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`database`]: storage backend selection and PostgreSQL settings
//! - [`screens`]: location of the screen catalog and default-permission bootstrap
//! - [`server`]: listener address
//!
//! # Example
//!
//! ```ignore
//! use toolbox_config::{JwtConfig, CorsConfig, DatabaseConfig, ScreensConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let cors_config = CorsConfig::from_env();
//! let database_config = DatabaseConfig::from_env();
//! let screens_config = ScreensConfig::from_env();
//! ```

pub mod cors;
pub mod database;
pub mod jwt;
pub mod screens;
pub mod server;

// Re-export commonly used types at crate root
pub use cors::CorsConfig;
pub use database::{DatabaseConfig, StorageBackend};
pub use jwt::JwtConfig;
pub use screens::ScreensConfig;
pub use server::ServerConfig;

/// Parses a boolean flag the way the environment usually spells it.
pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
