pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

use axum::{
    extract::{DefaultBodyLimit, OriginalUri, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::MarketConfig;
use crate::error::AppError;
use crate::services::{AssetStore, Database, TokenService};

/// Product images arrive inline in multipart bodies.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: MarketConfig,
    pub db: Database,
    pub tokens: TokenService,
    pub assets: AssetStore,
}

pub fn build_router(state: AppState) -> Router {
    // Super-admin surface. The role gate composes after authentication, so
    // the outer layer here must be the auth middleware.
    let super_admin_routes = Router::new()
        .route("/api/auth/admins", get(handlers::auth::list_admins))
        .route("/api/auth/admins/:id", delete(handlers::auth::delete_admin))
        .route("/api/products/all", get(handlers::products::all_products))
        .layer(from_fn(middleware::super_admin_middleware))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    // Seller surface: any authenticated account. Cross-tenant product deletion
    // by a super-admin is decided in the handler, not the route gate.
    let seller_routes = Router::new()
        .route("/api/products/mine", get(handlers::products::my_products))
        .route("/api/products", post(handlers::products::create_product))
        .route(
            "/api/products/:id",
            put(handlers::products::update_product).delete(handlers::products::delete_product),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route(
            "/api/products/available",
            get(handlers::products::available_products),
        )
        .merge(super_admin_routes)
        .merge(seller_routes)
        .fallback(route_not_found)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(cors)
}

fn cors_layer(config: &MarketConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn index() -> &'static str {
    "Marketplace backend running"
}

/// Service health check.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.db.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "Database health check failed");
        e
    })?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "checks": {
            "database": "up"
        }
    })))
}

async fn route_not_found(OriginalUri(uri): OriginalUri) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "message": format!("Route Not Found: {}", uri) })),
    )
}
