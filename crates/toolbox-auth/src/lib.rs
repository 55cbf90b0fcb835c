//! # Toolbox Auth
//!
//! Authentication types and JWT utilities for the Toolbox API.
//!
//! - [`claims`]: access token claims (subject, role ids, authorities)
//! - [`jwt`]: token creation and verification
//!
//! The server trusts the role ids carried by a verified token when it resolves
//! the caller's effective screen permissions; authorities (`ADMIN`, `USER`)
//! gate administrative operations.
//!
//! # Example
//!
//! ```ignore
//! use toolbox_auth::{create_access_token, verify_token};
//! use toolbox_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token("admin", vec![1], vec!["ADMIN".into()], &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert!(claims.is_admin());
//! ```

pub mod claims;
pub mod jwt;

// Re-export commonly used types at crate root
pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
