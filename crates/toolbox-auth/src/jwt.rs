//! JWT (JSON Web Token) utilities for authentication.
//!
//! Access tokens carry the caller's role ids and authorities so that
//! authorization decisions only need the permission store, not a user table.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use toolbox_config::JwtConfig;
use toolbox_core::AppError;

use crate::claims::Claims;

/// Creates an access token for `username` holding `role_ids` and `authorities`.
///
/// # Errors
///
/// Returns an internal error if token encoding fails.
pub fn create_access_token(
    username: &str,
    role_ids: Vec<i64>,
    authorities: Vec<String>,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let exp = (now + jwt_config.access_token_expiry).max(0) as usize;

    let claims = Claims {
        sub: username.to_string(),
        role_ids,
        authorities,
        exp,
        iat: now as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

/// Verifies an access token and returns the embedded claims.
///
/// # Errors
///
/// Returns an unauthorized error if the signature is invalid, the token has
/// expired, or it is malformed.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test_secret_key_for_testing_purposes".to_string(),
            access_token_expiry: 3600,
        }
    }

    #[test]
    fn test_create_and_verify_roundtrip() {
        let token =
            create_access_token("admin", vec![1], vec!["ADMIN".to_string()], &config()).unwrap();
        let claims = verify_token(&token, &config()).unwrap();

        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.role_ids, vec![1]);
        assert!(claims.is_admin());
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let token = create_access_token("admin", vec![], vec![], &config()).unwrap();
        let other = JwtConfig {
            secret: "another_secret".to_string(),
            access_token_expiry: 3600,
        };

        let err = verify_token(&token, &other).unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
    }

    #[test]
    fn test_verify_rejects_garbage() {
        assert!(verify_token("not-a-token", &config()).is_err());
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let expired = JwtConfig {
            secret: config().secret,
            access_token_expiry: -7200,
        };
        let token = create_access_token("admin", vec![], vec![], &expired).unwrap();
        assert!(verify_token(&token, &config()).is_err());
    }
}
