use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    dtos::auth::{AdminView, AuthResponse, LoginRequest, RegisterRequest},
    error::AppError,
    middleware::CurrentAdmin,
    models::NewAdmin,
    utils::{password, ValidatedJson},
    AppState,
};

/// Register a new seller account and hand back a session token.
///
/// The email pre-check gives the friendly error; the unique constraint in the
/// store backstops the race between concurrent registrations.
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if state.db.find_admin_by_email(&req.email).await?.is_some() {
        return Err(AppError::DuplicateEmail);
    }

    let password_hash = password::hash_password(&req.password)?;

    let admin = state
        .db
        .create_admin(&NewAdmin {
            name: req.name,
            email: req.email,
            phone: req.phone,
            location: req.location,
            password_hash,
        })
        .await?;

    let token = state.tokens.issue(admin.admin_id)?;
    tracing::info!(admin_id = %admin.admin_id, "Account registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            admin: AdminView::from(admin.profile()),
            token,
        }),
    ))
}

/// Verify credentials and hand back a session token.
///
/// Unknown email and wrong password are deliberately indistinguishable.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let admin = match state.db.find_admin_by_email(&req.email).await? {
        Some(admin) if password::verify_password(&req.password, &admin.password_hash) => admin,
        _ => {
            return Err(AppError::Unauthenticated(
                "Invalid email or password".to_string(),
            ))
        }
    };

    let token = state.tokens.issue(admin.admin_id)?;
    tracing::info!(admin_id = %admin.admin_id, "Account logged in");

    Ok(Json(AuthResponse {
        admin: AdminView::from(admin.profile()),
        token,
    }))
}

/// List every account. Super-admin gate runs in the middleware chain.
pub async fn list_admins(State(state): State<AppState>) -> Result<Json<Vec<AdminView>>, AppError> {
    let admins = state.db.list_admins().await?;
    Ok(Json(admins.into_iter().map(AdminView::from).collect()))
}

/// Delete an account. Super-admins cannot delete themselves.
pub async fn delete_admin(
    State(state): State<AppState>,
    CurrentAdmin(caller): CurrentAdmin,
    Path(admin_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if caller.admin_id == admin_id {
        return Err(AppError::InvalidOperation(
            "Cannot delete your own account".to_string(),
        ));
    }

    if !state.db.delete_admin(admin_id).await? {
        return Err(AppError::NotFound("Admin not found".to_string()));
    }

    tracing::info!(admin_id = %admin_id, deleted_by = %caller.admin_id, "Account deleted");
    Ok(StatusCode::NO_CONTENT)
}
