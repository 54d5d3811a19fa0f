pub mod auth;
pub mod product;

pub use auth::{AdminView, AuthResponse, LoginRequest, RegisterRequest};
pub use product::ProductResponse;
