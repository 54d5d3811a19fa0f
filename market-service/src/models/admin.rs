//! Admin/seller accounts.

use sqlx::FromRow;
use uuid::Uuid;

/// Full account row, including the password hash. Only the login path reads
/// this shape; everything downstream works with [`AdminProfile`].
#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub admin_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub password_hash: String,
    pub is_super_admin: bool,
}

impl Admin {
    /// Strip the password hash for anything that leaves the login path.
    pub fn profile(&self) -> AdminProfile {
        AdminProfile {
            admin_id: self.admin_id,
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            location: self.location.clone(),
            is_super_admin: self.is_super_admin,
        }
    }
}

/// Account context attached to authenticated requests. Never carries the
/// password hash; the store excludes it in the SELECT itself.
#[derive(Debug, Clone, FromRow)]
pub struct AdminProfile {
    pub admin_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub is_super_admin: bool,
}

/// Input for creating an account. `is_super_admin` is never client-supplied;
/// new accounts always start as regular sellers.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub password_hash: String,
}
