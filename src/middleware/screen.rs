//! Screen-level authorization.
//!
//! A caller's access to a screen is the union of the flags of every role in
//! their token. The `ADMIN` authority bypasses the check.

use toolbox_core::AppError;
use toolbox_models::PermissionFlags;
use tracing::debug;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl Access {
    fn allowed_by(self, flags: PermissionFlags) -> bool {
        match self {
            Access::Read => flags.can_read(),
            Access::Write => flags.can_write(),
        }
    }
}

/// Fails with `403` unless the caller may perform `access` on `screen_name`.
pub async fn ensure_screen_access(
    state: &AppState,
    auth_user: &AuthUser,
    screen_name: &str,
    access: Access,
) -> Result<(), AppError> {
    if auth_user.is_admin() {
        return Ok(());
    }

    let effective = state
        .permissions
        .effective_for_roles(&auth_user.role_ids())
        .await?;
    let flags = effective
        .get(screen_name)
        .copied()
        .unwrap_or(PermissionFlags::DENIED);

    if access.allowed_by(flags) {
        return Ok(());
    }

    debug!(user = %auth_user.username(), screen = %screen_name, ?access, "Screen access denied");
    Err(AppError::forbidden(format!(
        "Access denied. {} access to '{}' required",
        match access {
            Access::Read => "Read",
            Access::Write => "Write",
        },
        screen_name
    )))
}
