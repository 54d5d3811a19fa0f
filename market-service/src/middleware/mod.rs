pub mod auth;
pub mod super_admin;

pub use auth::{auth_middleware, CurrentAdmin};
pub use super_admin::super_admin_middleware;
