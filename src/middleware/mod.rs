pub mod auth;
pub mod screen;
