use axum::{extract::Request, middleware::Next, response::Response};

use crate::{error::AppError, middleware::auth::CurrentAdmin};

/// Role gate, composed after `auth_middleware`. Only lets the flagged
/// super-admin account through; everyone else gets a 403.
pub async fn super_admin_middleware(req: Request, next: Next) -> Result<Response, AppError> {
    let is_super_admin = req
        .extensions()
        .get::<CurrentAdmin>()
        .map(|admin| admin.0.is_super_admin)
        .unwrap_or(false);

    if !is_super_admin {
        return Err(AppError::Forbidden(
            "Access denied: super admin only".to_string(),
        ));
    }

    Ok(next.run(req).await)
}
