pub mod controller;
pub mod router;
pub mod service;

pub use router::{init_me_router, init_permissions_router};
pub use service::{DefaultsReport, PermissionService};
