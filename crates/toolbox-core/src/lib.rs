//! # Toolbox Core
//!
//! Core types, errors, and utilities for the Toolbox API.
//!
//! This crate provides foundational types used throughout the Toolbox application:
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`pagination`]: Pagination utilities for list endpoints
//! - [`screens`]: Names of the screens shipped in the default catalog
//! - [`serde`]: Custom serde deserialization helpers for query strings
//!
//! # Example
//!
//! ```ignore
//! use toolbox_core::errors::AppError;
//! use toolbox_core::pagination::{PaginationParams, PaginationMeta};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Role not found"));
//!
//! let params = PaginationParams::default();
//! let limit = params.limit();
//! ```

pub mod errors;
pub mod pagination;
pub mod screens;
pub mod serde;

// Re-export commonly used types at crate root
pub use errors::{AppError, AppResult};
pub use pagination::{PaginationMeta, PaginationParams};
