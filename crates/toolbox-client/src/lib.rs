//! # Toolbox Client
//!
//! Typed access to the permission API plus the client-side state the
//! permission screen works with.
//!
//! - [`PermissionApi`]: the remote operations, implemented over HTTP by
//!   [`HttpClient`]
//! - [`PermissionMatrix`]: an advisory, cached projection of one role's
//!   permissions. Never a source of truth; invalidated after every write.
//! - [`PermissionEditor`]: turns checkbox toggles into save requests and
//!   either applies the server's answer or rolls back, reporting the outcome
//!   as a [`PermissionEvent`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use toolbox_client::{HttpClient, PermissionEditor};
//!
//! let api = Arc::new(HttpClient::new("http://localhost:8080", Duration::from_secs(5))?.with_token(token));
//! let (editor, mut events) = PermissionEditor::load(api, role_id, Duration::from_secs(5)).await?;
//!
//! editor.toggle_read("Reports", true).await;
//! while let Ok(event) = events.try_recv() {
//!     println!("{event:?}");
//! }
//! ```

pub mod api;
pub mod editor;
pub mod error;
pub mod http;
pub mod matrix;

pub use api::PermissionApi;
pub use editor::{PermissionEditor, PermissionEvent};
pub use error::ClientError;
pub use http::HttpClient;
pub use matrix::PermissionMatrix;
