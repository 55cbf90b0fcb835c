//! Screen catalog configuration.
//!
//! # Environment Variables
//!
//! - `SCREENS_CONFIG_FILE`: path to a JSON screen catalog. When unset the
//!   built-in catalog is used.
//! - `PERMISSIONS_LOAD_DEFAULTS`: apply each screen's `default_permissions`
//!   at startup (default: `false`)

use std::env;
use std::path::PathBuf;

use crate::parse_flag;

#[derive(Clone, Debug, Default)]
pub struct ScreensConfig {
    pub config_file: Option<PathBuf>,
    pub load_default_permissions: bool,
}

impl ScreensConfig {
    pub fn from_env() -> Self {
        Self {
            config_file: env::var("SCREENS_CONFIG_FILE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            load_default_permissions: env::var("PERMISSIONS_LOAD_DEFAULTS")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }
}
