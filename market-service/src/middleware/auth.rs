use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, models::AdminProfile, AppState};

/// Middleware to require authentication.
///
/// Extracts the bearer token, verifies it, and loads the account it names.
/// The lookup doubles as the only revocation check: a token for a deleted
/// account stops working here. On success the account context (sans password
/// hash) rides along in request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| AppError::Unauthenticated("Not authorized, no token".to_string()))?
        .to_string();

    let admin_id = state.tokens.verify(&token).map_err(|e| {
        tracing::debug!(error = %e, "Token verification failed");
        AppError::Unauthenticated("Not authorized, invalid token".to_string())
    })?;

    let admin = state.db.find_admin_profile(admin_id).await?.ok_or_else(|| {
        AppError::Unauthenticated("Not authorized, account no longer exists".to_string())
    })?;

    req.extensions_mut().insert(CurrentAdmin(admin));

    Ok(next.run(req).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Extractor handing the attached account context to handlers.
#[derive(Debug, Clone)]
pub struct CurrentAdmin(pub AdminProfile);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentAdmin>().cloned().ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "Account context missing from request extensions"
            ))
        })
    }
}
