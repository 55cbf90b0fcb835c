//! JWT claim structures for access tokens.

use serde::{Deserialize, Serialize};
use toolbox_core::screens::ADMIN_AUTHORITY;
use utoipa::ToSchema;

/// JWT claims for access tokens.
///
/// - `sub`: username (subject)
/// - `role_ids`: ids of the roles held by the user
/// - `authorities`: coarse authorities such as `ADMIN` or `USER`
/// - `exp` / `iat`: expiry and issued-at timestamps
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// Username (subject claim)
    pub sub: String,
    /// Role IDs assigned to the user
    pub role_ids: Vec<i64>,
    /// Authorities granted to the user
    pub authorities: Vec<String>,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
}

impl Claims {
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a.eq_ignore_ascii_case(authority))
    }

    pub fn is_admin(&self) -> bool {
        self.has_authority(ADMIN_AUTHORITY)
    }
}
