//! Screen name constants for the Toolbox API.
//!
//! Screens are the navigable sections of the console that permissions are
//! granted on. Deployments may ship their own catalog file; these names make up
//! the catalog used when none is configured, and are referenced from code that
//! gates on a specific screen.
//!
//! # Example
//!
//! ```ignore
//! use toolbox_core::screens;
//!
//! ensure_screen_access(&state, &auth_user, screens::ROLES, Access::Write).await?;
//! ```

/// Task list screen
pub const TASK_LIST: &str = "Task List";
/// Functional areas reference screen
pub const FUNCTIONAL_AREAS: &str = "Functional Areas";
/// User administration screen
pub const USERS: &str = "Users";
/// Role administration screen
pub const ROLES: &str = "Roles";
/// Permission matrix screen
pub const PERMISSIONS: &str = "Permissions";
/// Analytics dashboard
pub const ANALYTICS: &str = "Analytics";
/// Reports screen
pub const REPORTS: &str = "Reports";
/// Settings screen
pub const SETTINGS: &str = "Settings";
/// Reference tables screen
pub const REFERENCE: &str = "Reference";

/// Default catalog as `(name, link)` pairs, in menu order.
pub const DEFAULT_SCREENS: [(&str, &str); 9] = [
    (TASK_LIST, "/task-list"),
    (FUNCTIONAL_AREAS, "/functional-area"),
    (USERS, "/users"),
    (ROLES, "/roles"),
    (PERMISSIONS, "/permissions"),
    (ANALYTICS, "/analytics"),
    (REPORTS, "/reports"),
    (SETTINGS, "/settings"),
    (REFERENCE, "/reference"),
];

/// Authority carried by administrators; bypasses per-screen checks.
pub const ADMIN_AUTHORITY: &str = "ADMIN";
/// Authority carried by regular console users.
pub const USER_AUTHORITY: &str = "USER";

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_screens_are_unique() {
        let names: HashSet<_> = DEFAULT_SCREENS.iter().map(|(name, _)| *name).collect();
        assert_eq!(names.len(), DEFAULT_SCREENS.len());
    }

    #[test]
    fn test_default_screen_links_are_absolute() {
        assert!(DEFAULT_SCREENS.iter().all(|(_, link)| link.starts_with('/')));
    }
}
