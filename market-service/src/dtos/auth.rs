use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::AdminProfile;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub phone: Option<String>,

    pub location: Option<String>,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public account view; never carries the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub is_super_admin: bool,
}

impl From<AdminProfile> for AdminView {
    fn from(profile: AdminProfile) -> Self {
        Self {
            id: profile.admin_id,
            name: profile.name,
            email: profile.email,
            phone: profile.phone,
            location: profile.location,
            is_super_admin: profile.is_super_admin,
        }
    }
}

/// Account view plus a fresh session token; returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub admin: AdminView,
    pub token: String,
}
