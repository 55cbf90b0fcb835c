//! The screen catalog.
//!
//! Screens are a closed set defined by deployment configuration. A catalog
//! file looks like:
//!
//! ```json
//! {
//!   "screens": [
//!     {
//!       "id": 1,
//!       "title": "Task List",
//!       "link": "/task-list",
//!       "enabled": true,
//!       "showInMenu": true,
//!       "order": 1,
//!       "defaultPermissions": { "ADMINISTRATOR": { "canRead": true, "canWrite": true } }
//!     }
//!   ]
//! }
//! ```
//!
//! The screen's `title` is the name permissions are keyed on.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use toolbox_core::screens::{self, DEFAULT_SCREENS};
use utoipa::ToSchema;

use crate::permissions::{InvalidPermissionState, PermissionFlags};

/// Role name granted full access on every screen of the built-in catalog.
pub const DEFAULT_ADMIN_ROLE: &str = "ADMINISTRATOR";
/// Role name granted read access on a few screens of the built-in catalog.
pub const DEFAULT_USER_ROLE: &str = "USER";

/// Matches the `permissions.screen_name` column width.
pub const MAX_SCREEN_TITLE_LEN: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read screen catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid screen catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("screen '{0}' is defined more than once")]
    DuplicateScreen(String),
    #[error("screen with id {0} has a blank title")]
    BlankTitle(i32),
    #[error("screen with id {0} has a title longer than {MAX_SCREEN_TITLE_LEN} characters")]
    TitleTooLong(i32),
}

/// Flags as written in a catalog file.
///
/// Kept unvalidated so that one bad entry does not reject the whole file;
/// [`DefaultPermission::flags`] applies the write-implies-read rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct DefaultPermission {
    #[serde(alias = "canRead", default)]
    pub can_read: bool,
    #[serde(alias = "canWrite", default)]
    pub can_write: bool,
}

impl DefaultPermission {
    pub fn flags(&self) -> Result<PermissionFlags, InvalidPermissionState> {
        PermissionFlags::new(self.can_read, self.can_write)
    }
}

impl From<PermissionFlags> for DefaultPermission {
    fn from(flags: PermissionFlags) -> Self {
        Self {
            can_read: flags.can_read(),
            can_write: flags.can_write(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScreenDefinition {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, alias = "showInMenu")]
    pub show_in_menu: bool,
    #[serde(default, alias = "showInDashboard")]
    pub show_in_dashboard: bool,
    #[serde(default)]
    pub order: i32,
    /// Role name to flags applied when default bootstrap is enabled.
    #[serde(default, alias = "defaultPermissions")]
    pub default_permissions: BTreeMap<String, DefaultPermission>,
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    screens: Vec<ScreenDefinition>,
}

/// Known screens, ordered by their `order` field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ScreenCatalog {
    screens: Vec<ScreenDefinition>,
}

impl ScreenCatalog {
    pub fn new(mut screens: Vec<ScreenDefinition>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for screen in &mut screens {
            let title = screen.title.trim();
            if title.is_empty() {
                return Err(CatalogError::BlankTitle(screen.id));
            }
            if title.chars().count() > MAX_SCREEN_TITLE_LEN {
                return Err(CatalogError::TitleTooLong(screen.id));
            }
            if !seen.insert(title.to_string()) {
                return Err(CatalogError::DuplicateScreen(title.to_string()));
            }
            screen.title = title.to_string();
        }
        screens.sort_by_key(|s| (s.order, s.id));
        Ok(Self { screens })
    }

    /// The nine screens shipped with the console.
    pub fn default_catalog() -> Self {
        let screens = DEFAULT_SCREENS
            .iter()
            .enumerate()
            .map(|(i, (title, link))| {
                let position = i as i32 + 1;
                let mut default_permissions = BTreeMap::new();
                default_permissions.insert(
                    DEFAULT_ADMIN_ROLE.to_string(),
                    DefaultPermission::from(PermissionFlags::READ_WRITE),
                );
                if matches!(*title, screens::TASK_LIST | screens::ANALYTICS | screens::REPORTS) {
                    default_permissions.insert(
                        DEFAULT_USER_ROLE.to_string(),
                        DefaultPermission::from(PermissionFlags::READ_ONLY),
                    );
                }
                ScreenDefinition {
                    id: position,
                    title: title.to_string(),
                    description: None,
                    link: Some(link.to_string()),
                    icon: None,
                    enabled: true,
                    show_in_menu: true,
                    show_in_dashboard: true,
                    order: position,
                    default_permissions,
                }
            })
            .collect();
        Self { screens }
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.screens)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn contains(&self, screen_name: &str) -> bool {
        self.get(screen_name).is_some()
    }

    pub fn get(&self, screen_name: &str) -> Option<&ScreenDefinition> {
        self.screens.iter().find(|s| s.title == screen_name)
    }

    pub fn screens(&self) -> &[ScreenDefinition] {
        &self.screens
    }

    /// Screen names in catalog order.
    pub fn names(&self) -> Vec<String> {
        self.screens.iter().map(|s| s.title.clone()).collect()
    }
}
